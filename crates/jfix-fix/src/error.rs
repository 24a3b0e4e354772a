use jfix_ast::{FileId, NodeId};
use jfix_core::EditError;
use thiserror::Error;

/// Failure while materializing a fix. Aborts that fix only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixError {
    #[error("compilation unit {0} is not part of the project")]
    UnknownUnit(FileId),
    #[error("node {node:?} does not belong to {file}")]
    StaleNode { file: FileId, node: NodeId },
    #[error("conflicting rewrites of node {node:?} in {file}")]
    ConflictingChange { file: FileId, node: NodeId },
    #[error("type {0} has no source declaration")]
    NoSourceDeclaration(String),
    #[error("method {0} has no source declaration")]
    NoMethodDeclaration(String),
    #[error(transparent)]
    Edit(#[from] EditError),
}
