use jfix_ast::Modifiers;
use jfix_fix::{create_clean_up, CodeStyleOptions, Fix, RemoveTarget, RewriteOperation};
use jfix_test_utils::java::*;
use jfix_test_utils::ProjectFixture;
use pretty_assertions::assert_eq;

use super::apply;

fn remove_both() -> CodeStyleOptions {
    CodeStyleOptions {
        remove_field_qualifier: true,
        remove_method_qualifier: true,
        ..CodeStyleOptions::default()
    }
}

#[test]
fn redundant_qualifiers_are_removed() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let size = fx.method(e, "size", &[], Some(wk.int), Modifiers::NONE);
    let total = fx.method(e, "total", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .method(size, vec![ret(Some(int(0)))])
                .method(
                    total,
                    vec![ret(Some(infix(
                        field(this(), count),
                        "+",
                        call_on(this(), size, vec![]),
                    )))],
                ),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(&project, &file, &[], remove_both()).expect("both are redundant");
    assert!(matches!(
        fix.operations(),
        [
            RewriteOperation::RemoveThisQualifier(RemoveTarget::Field(_)),
            RewriteOperation::RemoveThisQualifier(RemoveTarget::Method(_)),
        ]
    ));
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private int count;
    int size() {
        return 0;
    }
    int total() {
        return count + size();
    }
}
"#
    );
}

#[test]
fn independent_removals_apply_in_either_order() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let size = fx.method(e, "size", &[], Some(wk.int), Modifiers::NONE);
    let total = fx.method(e, "total", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .method(size, vec![ret(Some(int(0)))])
                .method(
                    total,
                    vec![ret(Some(infix(
                        field(this(), count),
                        "+",
                        call_on(this(), size, vec![]),
                    )))],
                ),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(&project, &file, &[], remove_both()).expect("both are redundant");
    let mut reversed = fix.operations().to_vec();
    reversed.reverse();
    let reversed = Fix::new(fix.name(), file.clone(), reversed).expect("non-empty");

    assert_eq!(apply(&project, &reversed), apply(&project, &fix));
    for operation in fix.operations() {
        let single =
            Fix::new(fix.name(), file.clone(), vec![operation.clone()]).expect("non-empty");
        assert_ne!(apply(&project, &single), project.unit(&file).unwrap().text());
    }
}

#[test]
fn local_initialized_from_the_shadowed_field_keeps_qualifier() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let reset = fx.method(e, "reset", &[], None, Modifiers::NONE);
    let local_count = fx.local("count", wk.int);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .method(reset, vec![local(local_count, Some(field(this(), count)))]),
        ),
    );
    let project = fx.into_project();

    // `int count = count;` would read the uninitialized local.
    assert_eq!(create_clean_up(&project, &file, &[], remove_both()), None);
}

#[test]
fn earlier_local_of_the_same_name_blocks_removal() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let local_count = fx.local("count", wk.int);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).field(count, None).method(
                get,
                vec![
                    local(local_count, Some(int(1))),
                    ret(Some(field(this(), count))),
                ],
            ),
        ),
    );
    let project = fx.into_project();

    assert_eq!(create_clean_up(&project, &file, &[], remove_both()), None);
}

#[test]
fn later_local_of_the_same_name_does_not_block_removal() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let reset = fx.method(e, "reset", &[], None, Modifiers::NONE);
    let local_count = fx.local("count", wk.int);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).field(count, None).method(
                reset,
                vec![
                    expr(assign(field(this(), count), int(0))),
                    local(local_count, Some(int(1))),
                ],
            ),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(&project, &file, &[], remove_both()).expect("qualifier is redundant");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private int count;
    void reset() {
        count = 0;
        int count = 1;
    }
}
"#
    );
}

#[test]
fn shadowing_parameter_blocks_removal() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let set = fx.method(e, "set", &[(wk.int, "count")], None, Modifiers::NONE);
    let param = fx.param(set, 0);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .method(set, vec![expr(assign(field(this(), count), var(param)))]),
        ),
    );
    let project = fx.into_project();

    assert_eq!(create_clean_up(&project, &file, &[], remove_both()), None);
}

#[test]
fn field_of_anonymous_class_blocks_outer_this_removal() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let task = fx.interface("p", "Task");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let anon = fx.anonymous(e, task);
    let shadow = fx.field(anon, "count", wk.int, Modifiers::NONE);
    let size = fx.method(anon, "size", &[], Some(wk.int), Modifiers::PUBLIC);
    let make = fx.method(e, "make", &[], Some(task), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).field(count, None).method(
                make,
                vec![ret(Some(new_anonymous(
                    task,
                    TypeDecl::new(anon)
                        .field(shadow, None)
                        .method(size, vec![ret(Some(field(outer_this(e), count)))]),
                )))],
            ),
        ),
    );
    let project = fx.into_project();

    assert_eq!(create_clean_up(&project, &file, &[], remove_both()), None);
}

#[test]
fn outer_this_field_is_removed_when_nothing_shadows_it() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let inner = fx.nested_class(e, "Inner", Modifiers::NONE);
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let get = fx.method(inner, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).field(count, None).nested(
                TypeDecl::new(inner).method(get, vec![ret(Some(field(outer_this(e), count)))]),
            ),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(&project, &file, &[], remove_both()).expect("qualifier is redundant");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private int count;
    class Inner {
        int get() {
            return count;
        }
    }
}
"#
    );
}

#[test]
fn outer_this_call_is_removed_from_unrelated_inner_class() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let inner = fx.nested_class(e, "Inner", Modifiers::NONE);
    let log = fx.method(e, "log", &[], None, Modifiers::NONE);
    let run = fx.method(inner, "run", &[], None, Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).method(log, vec![]).nested(
                TypeDecl::new(inner).method(run, vec![expr(call_on(outer_this(e), log, vec![]))]),
            ),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(&project, &file, &[], remove_both()).expect("qualifier is redundant");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    void log() {
    }
    class Inner {
        void run() {
            log();
        }
    }
}
"#
    );
}

#[test]
fn outer_this_call_is_kept_when_inner_class_inherits_the_method() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let inner = fx.nested_class(e, "Inner", Modifiers::NONE);
    fx.extends(inner, e);
    let log = fx.method(e, "log", &[], None, Modifiers::NONE);
    let run = fx.method(inner, "run", &[], None, Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).method(log, vec![]).nested(
                TypeDecl::new(inner).method(run, vec![expr(call_on(outer_this(e), log, vec![]))]),
            ),
        ),
    );
    let project = fx.into_project();

    assert_eq!(create_clean_up(&project, &file, &[], remove_both()), None);
}

#[test]
fn overload_in_inner_class_blocks_call_removal() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let inner = fx.nested_class(e, "Inner", Modifiers::NONE);
    let wk = fx.wk();
    let log = fx.method(e, "log", &[], None, Modifiers::NONE);
    let inner_log = fx.method(inner, "log", &[(wk.string, "message")], None, Modifiers::NONE);
    let run = fx.method(inner, "run", &[], None, Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e).method(log, vec![]).nested(
                TypeDecl::new(inner)
                    .method(inner_log, vec![])
                    .method(run, vec![expr(call_on(outer_this(e), log, vec![]))]),
            ),
        ),
    );
    let project = fx.into_project();

    // A plain `log()` would only see Inner's overloads.
    assert_eq!(create_clean_up(&project, &file, &[], remove_both()), None);
}
