use jfix_ast::{FileId, Modifiers, ProblemKind, ProblemLocation, SyntaxKind};
use jfix_fix::{
    apply_fixes, create_add_field_qualifier_fix, create_indirect_access_to_static_fix,
    create_non_static_access_fixes, Fix, FixError, FormatOptions, RewriteOperation,
    StaticAccessKind,
};
use jfix_test_utils::java::*;
use jfix_test_utils::{find_nodes, problem_at, ProjectFixture};
use pretty_assertions::assert_eq;

use super::{apply, labels};

#[test]
fn instance_access_to_static_method_offers_both_types() {
    let mut fx = ProjectFixture::new();
    let base = fx.class("p", "Base");
    let sub = fx.class("p", "Sub");
    fx.extends(sub, base);
    let e = fx.class("p", "E");
    let create = fx.method(base, "create", &[], None, Modifiers::PUBLIC | Modifiers::STATIC);
    let run = fx.method(e, "run", &[(sub, "s")], None, Modifiers::PUBLIC);
    let s = fx.param(run, 0);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(
        TypeDecl::new(e).method(run, vec![expr(call_on(var(s), create, vec![]))]),
    ));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problem = problem_at(
        tree,
        ProblemKind::NonStaticAccessToStaticMethod,
        SyntaxKind::MethodInvocation,
        "s.create()",
    );

    let fixes = create_non_static_access_fixes(&project, &file, &problem);
    assert_eq!(
        labels(&fixes),
        vec![
            "Change access to static using 'Base' (declaring type)",
            "Change access to static using 'Sub' (instance type)",
        ]
    );
    assert!(matches!(
        fixes[1].operations()[0],
        RewriteOperation::ToStaticAccess {
            kind: StaticAccessKind::Instance,
            ..
        }
    ));

    assert_eq!(
        apply(&project, &fixes[0]),
        r#"package p;

public class E {
    public void run(Sub s) {
        Base.create();
    }
}
"#
    );
    assert_eq!(
        apply(&project, &fixes[1]),
        r#"package p;

public class E {
    public void run(Sub s) {
        Sub.create();
    }
}
"#
    );
}

#[test]
fn package_private_declaring_type_elsewhere_is_not_offered() {
    let mut fx = ProjectFixture::new();
    let base = fx.package_class("q", "Base");
    let sub = fx.class("q", "Sub");
    fx.extends(sub, base);
    let e = fx.class("p", "E");
    let create = fx.method(base, "create", &[], None, Modifiers::PUBLIC | Modifiers::STATIC);
    let run = fx.method(e, "run", &[(sub, "s")], None, Modifiers::PUBLIC);
    let s = fx.param(run, 0);
    let file = fx.write_unit(Unit::new("E.java").package("p").import("q.Sub").ty(
        TypeDecl::new(e).method(run, vec![expr(call_on(var(s), create, vec![]))]),
    ));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problem = problem_at(
        tree,
        ProblemKind::NonStaticAccessToStaticMethod,
        SyntaxKind::MethodInvocation,
        "s.create()",
    );

    let fixes = create_non_static_access_fixes(&project, &file, &problem);
    assert_eq!(
        labels(&fixes),
        vec!["Change access to static using 'Sub' (instance type)"]
    );
    assert_eq!(
        apply(&project, &fixes[0]),
        r#"package p;

import q.Sub;

public class E {
    public void run(Sub s) {
        Sub.create();
    }
}
"#
    );
}

#[test]
fn method_call_qualifier_is_hoisted_into_its_own_statement() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let make = fx.method(e, "make", &[], Some(e), Modifiers::NONE);
    let reset = fx.method(e, "reset", &[], None, Modifiers::STATIC);
    let run = fx.method(e, "run", &[], None, Modifiers::PUBLIC);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .method(make, vec![ret(Some(null()))])
                .method(run, vec![expr(call_on(call(make, vec![]), reset, vec![]))]),
        ),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problem = problem_at(
        tree,
        ProblemKind::NonStaticAccessToStaticMethod,
        SyntaxKind::MethodInvocation,
        "make().reset()",
    );

    let fixes = create_non_static_access_fixes(&project, &file, &problem);
    assert_eq!(
        labels(&fixes),
        vec!["Change access to static using 'E' (declaring type)"]
    );
    assert_eq!(
        apply(&project, &fixes[0]),
        r#"package p;

public class E {
    E make() {
        return null;
    }
    public void run() {
        make();
        E.reset();
    }
}
"#
    );
}

#[test]
fn field_initializer_qualifier_is_replaced_without_hoisting() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let make = fx.method(e, "make", &[], Some(e), Modifiers::STATIC);
    let max = fx.field(e, "MAX", wk.int, Modifiers::STATIC | Modifiers::FINAL);
    let cached = fx.field(e, "cached", wk.int, Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java")
            .package("p")
            .ty(TypeDecl::new(e).field(cached, Some(field(call(make, vec![]), max)))),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problem = problem_at(
        tree,
        ProblemKind::NonStaticAccessToStaticField,
        SyntaxKind::FieldAccess,
        "make().MAX",
    );

    let fixes = create_non_static_access_fixes(&project, &file, &problem);
    assert_eq!(fixes.len(), 1);
    assert_eq!(
        apply(&project, &fixes[0]),
        r#"package p;

public class E {
    int cached = E.MAX;
}
"#
    );
}

#[test]
fn indirect_static_access_uses_declaring_type() {
    let mut fx = ProjectFixture::new();
    let base = fx.class("p", "Base");
    let sub = fx.class("p", "Sub");
    fx.extends(sub, base);
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let max = fx.field(base, "MAX", wk.int, Modifiers::PUBLIC | Modifiers::STATIC);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(
        TypeDecl::new(e).method(get, vec![ret(Some(qualified(type_name(sub), max)))]),
    ));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problem = problem_at(
        tree,
        ProblemKind::IndirectAccessToStaticField,
        SyntaxKind::QualifiedName,
        "Sub.MAX",
    );

    // Wrong problem kinds get nothing.
    assert!(create_non_static_access_fixes(&project, &file, &problem).is_empty());

    let fix = create_indirect_access_to_static_fix(&project, &file, &problem)
        .expect("indirect access should be fixable");
    assert_eq!(fix.name(), "Change indirect access to static using 'Base'");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    int get() {
        return Base.MAX;
    }
}
"#
    );
}

#[test]
fn add_field_qualifier_targets_instance_fields_only() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let max = fx.field(e, "MAX", wk.int, Modifiers::STATIC);
    let sum = fx.method(e, "sum", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .field(max, None)
                .method(sum, vec![ret(Some(infix(var(count), "+", var(max))))]),
        ),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();

    let on_static = problem_at(
        tree,
        ProblemKind::UnqualifiedFieldAccess,
        SyntaxKind::SimpleName,
        "MAX",
    );
    // The first `MAX` is the declaration; neither it nor the read is an instance field.
    assert_eq!(create_add_field_qualifier_fix(&project, &file, &on_static), None);

    let read = find_nodes(tree, SyntaxKind::SimpleName, "count")[1];
    let problem = ProblemLocation::at_node(ProblemKind::UnqualifiedFieldAccess, tree, read);
    let fix = create_add_field_qualifier_fix(&project, &file, &problem)
        .expect("instance field read should be fixable");
    assert_eq!(fix.name(), "Qualify 'count' with 'this'");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private int count;
    static int MAX;
    int sum() {
        return this.count + MAX;
    }
}
"#
    );
}

#[test]
fn failing_fix_does_not_affect_the_others() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java")
            .package("p")
            .ty(TypeDecl::new(e).field(count, None).method(get, vec![ret(Some(var(count)))])),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let read = find_nodes(tree, SyntaxKind::SimpleName, "count")[1];
    let problem = ProblemLocation::at_node(ProblemKind::UnqualifiedFieldAccess, tree, read);
    let good = create_add_field_qualifier_fix(&project, &file, &problem).unwrap();
    let missing = FileId::new("Missing.java");
    let bad = Fix::new("broken", missing.clone(), good.operations().to_vec()).unwrap();

    let results = apply_fixes(&project, &[bad, good], &FormatOptions::default());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], Err(FixError::UnknownUnit(missing)));
    let change = results[1].as_ref().expect("second fix should apply");
    assert_eq!(change.groups.len(), 1);
    assert_eq!(change.groups[0].description, "Qualify 'count' with 'this'");
}

#[test]
fn preview_shows_unified_diff() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java")
            .package("p")
            .ty(TypeDecl::new(e).field(count, None).method(get, vec![ret(Some(var(count)))])),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let read = find_nodes(tree, SyntaxKind::SimpleName, "count")[1];
    let problem = ProblemLocation::at_node(ProblemKind::UnqualifiedFieldAccess, tree, read);
    let fix = create_add_field_qualifier_fix(&project, &file, &problem).unwrap();

    let preview = fix.preview(&project, &FormatOptions::default()).unwrap();
    assert_eq!(preview.name, "Qualify 'count' with 'this'");
    assert_eq!(preview.edit_count, 1);
    assert!(preview.unified_diff.starts_with("--- a/E.java\n+++ b/E.java\n"));
    assert!(preview
        .unified_diff
        .contains("-        return count;\n+        return this.count;\n"));
}
