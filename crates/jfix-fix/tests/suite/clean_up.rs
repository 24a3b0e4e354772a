use jfix_ast::{Modifiers, ProblemKind, ProblemLocation, SyntaxKind};
use jfix_fix::{
    create_clean_up, create_clean_up_for_problems, CodeStyleOptions, CodeStyleVisitor,
    RewriteOperation,
};
use jfix_test_utils::java::*;
use jfix_test_utils::{find_nodes, problem_at, ProjectFixture};
use pretty_assertions::assert_eq;

use super::apply;

fn options(configure: impl FnOnce(&mut CodeStyleOptions)) -> CodeStyleOptions {
    let mut options = CodeStyleOptions::default();
    configure(&mut options);
    options
}

#[test]
fn private_field_gets_plain_this_qualifier() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::PUBLIC);
    let file = fx.write_unit(
        Unit::new("E.java")
            .package("p")
            .ty(TypeDecl::new(e).field(count, None).method(get, vec![ret(Some(var(count)))])),
    );
    let project = fx.into_project();

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| o.qualify_field_access = true),
    )
    .expect("clean-up should find the access");
    assert_eq!(fix.name(), "Change code style");
    assert_eq!(fix.operations().len(), 1);
    assert!(matches!(
        &fix.operations()[0],
        RewriteOperation::AddThisQualifier { qualifier: None, identifier, .. }
            if identifier == "count"
    ));

    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private int count;
    public int get() {
        return this.count;
    }
}
"#
    );
}

#[test]
fn static_field_of_anonymous_class_is_left_alone() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let task = fx.interface("p", "Task");
    let wk = fx.wk();
    let anon = fx.anonymous(e, task);
    let limit = fx.field(anon, "LIMIT", wk.int, Modifiers::STATIC | Modifiers::FINAL);
    let run = fx.method(anon, "run", &[], None, Modifiers::PUBLIC);
    let x = fx.local("x", wk.int);
    let make = fx.method(e, "make", &[], Some(task), Modifiers::NONE);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(TypeDecl::new(e).method(
        make,
        vec![ret(Some(new_anonymous(
            task,
            TypeDecl::new(anon)
                .field(limit, Some(int(1)))
                .method(run, vec![local(x, Some(var(limit)))]),
        )))],
    )));
    let project = fx.into_project();

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| o.qualify_static_field_access = true),
    );
    assert_eq!(fix, None);
}

#[test]
fn already_qualified_unit_yields_nothing() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let max = fx.field(e, "MAX", wk.int, Modifiers::STATIC);
    let foo = fx.method(e, "foo", &[], None, Modifiers::NONE);
    let run = fx.method(e, "run", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .field(max, None)
                .method(foo, vec![])
                .method(
                    run,
                    vec![
                        expr(call_on(this(), foo, vec![])),
                        ret(Some(infix(
                            field(this(), count),
                            "+",
                            qualified(type_name(e), max),
                        ))),
                    ],
                ),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| {
            o.qualify_field_access = true;
            o.qualify_static_field_access = true;
            o.qualify_method_access = true;
        }),
    );
    assert_eq!(fix, None);
}

#[test]
fn static_only_options_leave_instance_fields_alone() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::NONE);
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

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| o.qualify_static_field_access = true),
    )
    .expect("static access should be qualified");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    int count;
    static int MAX;
    int sum() {
        return count + E.MAX;
    }
}
"#
    );
}

#[test]
fn outer_field_from_inner_class_uses_outer_this() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let inner = fx.nested_class(e, "Inner", Modifiers::NONE);
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let get = fx.method(inner, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .nested(TypeDecl::new(inner).method(get, vec![ret(Some(var(count)))])),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| o.qualify_field_access = true),
    )
    .expect("outer field should be qualified");
    assert_eq!(
        fix.operations()[0].description(),
        "Qualify 'count' with 'E.this'"
    );
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private int count;
    class Inner {
        int get() {
            return E.this.count;
        }
    }
}
"#
    );
}

#[test]
fn static_final_assigned_in_static_initializer_is_not_qualified() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let limit = fx.field(e, "LIMIT", wk.int, Modifiers::STATIC | Modifiers::FINAL);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(limit, None)
                .initializer(true, vec![expr(assign(var(limit), int(3)))])
                .method(get, vec![ret(Some(var(limit)))]),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| o.qualify_static_field_access = true),
    )
    .expect("the read in get() should be qualified");
    assert_eq!(fix.operations().len(), 1);
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    static final int LIMIT;
    static {
        LIMIT = 3;
    }
    int get() {
        return E.LIMIT;
    }
}
"#
    );
}

#[test]
fn method_calls_get_this_or_declaring_class() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let foo = fx.method(e, "foo", &[], None, Modifiers::NONE);
    let create = fx.method(e, "create", &[], None, Modifiers::STATIC);
    let run = fx.method(e, "run", &[], None, Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .method(foo, vec![])
                .method(create, vec![])
                .method(run, vec![expr(call(foo, vec![])), expr(call(create, vec![]))]),
        ),
    );
    let project = fx.into_project();

    let fix = create_clean_up(
        &project,
        &file,
        &[],
        options(|o| {
            o.qualify_method_access = true;
            o.qualify_static_method_access = true;
        }),
    )
    .expect("both calls should be qualified");
    let descriptions: Vec<String> = fix.operations().iter().map(|op| op.description()).collect();
    assert_eq!(
        descriptions,
        vec!["Qualify 'foo' with 'this'", "Qualify method call with declaring class"]
    );
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    void foo() {
    }
    static void create() {
    }
    void run() {
        this.foo();
        E.create();
    }
}
"#
    );
}

#[test]
fn hoisted_instance_creations_share_one_new_block() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let max = fx.method(
        e,
        "max",
        &[(wk.int, "value")],
        Some(wk.int),
        Modifiers::PUBLIC | Modifiers::STATIC,
    );
    let zero = fx.method(e, "zero", &[], Some(wk.int), Modifiers::PUBLIC | Modifiers::STATIC);
    let run = fx.method(e, "run", &[(wk.boolean, "flag")], None, Modifiers::PUBLIC);
    let flag = fx.param(run, 0);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(TypeDecl::new(e).method(
        run,
        vec![if_(
            var(flag),
            expr(call_on(
                new_object(e, None, vec![]),
                max,
                vec![call_on(new_object(e, None, vec![]), zero, vec![])],
            )),
            None,
        )],
    )));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problems = vec![
        problem_at(
            tree,
            ProblemKind::NonStaticAccessToStaticMethod,
            SyntaxKind::MethodInvocation,
            "new E().max(new E().zero())",
        ),
        problem_at(
            tree,
            ProblemKind::NonStaticAccessToStaticMethod,
            SyntaxKind::MethodInvocation,
            "new E().zero()",
        ),
    ];

    let fix = create_clean_up(
        &project,
        &file,
        &problems,
        options(|o| o.change_non_static_access_to_static = true),
    )
    .expect("both accesses should be converted");
    assert_eq!(fix.operations().len(), 2);
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    public void run(boolean flag) {
        if (flag) {
            new E();
            new E();
            E.max(E.zero());
        }
    }
}
"#
    );
}

#[test]
fn chained_receivers_are_hoisted_inside_out() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let make = fx.method(e, "make", &[], Some(e), Modifiers::STATIC);
    let reset = fx.method(e, "reset", &[], None, Modifiers::STATIC);
    let run = fx.method(e, "run", &[], None, Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .method(make, vec![])
                .method(reset, vec![])
                .method(
                    run,
                    vec![expr(call_on(
                        call_on(new_object(e, None, vec![]), make, vec![]),
                        reset,
                        vec![],
                    ))],
                ),
        ),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problems = vec![
        problem_at(
            tree,
            ProblemKind::NonStaticAccessToStaticMethod,
            SyntaxKind::MethodInvocation,
            "new E().make().reset()",
        ),
        problem_at(
            tree,
            ProblemKind::NonStaticAccessToStaticMethod,
            SyntaxKind::MethodInvocation,
            "new E().make()",
        ),
    ];

    let fix = create_clean_up_for_problems(&project, &file, &problems, false, true, false)
        .expect("both accesses should be converted");
    assert_eq!(fix.operations().len(), 2);
    // `new E()` is evaluated before `make()`, so its statement comes first.
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    static E make() {
    }
    static void reset() {
    }
    void run() {
        new E();
        E.make();
        E.reset();
    }
}
"#
    );
}

#[test]
fn inaccessible_declaring_type_is_not_replaced_by_the_instance_type() {
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
    let problems = vec![problem_at(
        tree,
        ProblemKind::NonStaticAccessToStaticMethod,
        SyntaxKind::MethodInvocation,
        "s.create()",
    )];

    assert_eq!(
        create_clean_up_for_problems(&project, &file, &problems, false, true, false),
        None
    );
}

#[test]
fn detection_is_idempotent() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::PRIVATE);
    let limit = fx.field(e, "LIMIT", wk.int, Modifiers::STATIC | Modifiers::FINAL);
    let size = fx.method(e, "size", &[], Some(wk.int), Modifiers::NONE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java").package("p").ty(
            TypeDecl::new(e)
                .field(count, None)
                .field(limit, Some(int(10)))
                .method(size, vec![ret(Some(var(count)))])
                .method(
                    get,
                    vec![ret(Some(infix(call(size, vec![]), "+", var(limit))))],
                ),
        ),
    );
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let all = options(|o| {
        o.qualify_field_access = true;
        o.qualify_static_field_access = true;
        o.qualify_method_access = true;
        o.qualify_static_method_access = true;
    });

    let first = CodeStyleVisitor::new(&project, tree, all).collect(tree);
    let second = CodeStyleVisitor::new(&project, tree, all).collect(tree);
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);

    let fix = create_clean_up(&project, &file, &[], all);
    assert!(fix.is_some());
    assert_eq!(fix, create_clean_up(&project, &file, &[], all));
}

#[test]
fn deeply_nested_access_is_qualified_with_the_innermost_subtype() {
    let mut fx = ProjectFixture::new();
    let outer = fx.class("p", "Outer");
    let middle = fx.nested_class(outer, "Middle", Modifiers::NONE);
    let inner = fx.nested_class(middle, "Inner", Modifiers::NONE);
    let deeper = fx.nested_class(inner, "Deeper", Modifiers::NONE);
    let wk = fx.wk();
    let value = fx.field(inner, "value", wk.int, Modifiers::PRIVATE);
    let get = fx.method(deeper, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(Unit::new("Outer.java").package("p").ty(
        TypeDecl::new(outer).nested(TypeDecl::new(middle).nested(
            TypeDecl::new(inner).field(value, None).nested(
                TypeDecl::new(deeper).method(get, vec![ret(Some(var(value)))]),
            ),
        )),
    ));
    let project = fx.into_project();
    let qualify = options(|o| o.qualify_field_access = true);

    let fix = create_clean_up(&project, &file, &[], qualify).expect("value should be qualified");
    assert_eq!(
        fix.operations()[0].description(),
        "Qualify 'value' with 'Outer.Middle.Inner.this'"
    );
    assert_eq!(Some(&fix), create_clean_up(&project, &file, &[], qualify).as_ref());
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class Outer {
    class Middle {
        class Inner {
            private int value;
            class Deeper {
                int get() {
                    return Outer.Middle.Inner.this.value;
                }
            }
        }
    }
}
"#
    );
}

#[test]
fn hoisted_statements_in_a_block_go_before_the_statement() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let reset = fx.method(e, "reset", &[], None, Modifiers::STATIC);
    let run = fx.method(e, "run", &[], None, Modifiers::NONE);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(TypeDecl::new(e).method(
        run,
        vec![
            expr(call_on(new_object(e, None, vec![]), reset, vec![])),
            expr(call_on(new_object(e, None, vec![]), reset, vec![])),
        ],
    )));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problems: Vec<ProblemLocation> =
        find_nodes(tree, SyntaxKind::MethodInvocation, "new E().reset()")
            .into_iter()
            .map(|node| {
                ProblemLocation::at_node(ProblemKind::NonStaticAccessToStaticMethod, tree, node)
            })
            .collect();
    assert_eq!(problems.len(), 2);

    let fix = create_clean_up_for_problems(&project, &file, &problems, false, true, false)
        .expect("both accesses should be converted");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    void run() {
        new E();
        E.reset();
        new E();
        E.reset();
    }
}
"#
    );
}

#[test]
fn static_conversion_replaces_this_qualifier_on_the_same_name() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let helper_ty = fx.class("p", "Helper");
    let wk = fx.wk();
    let max = fx.field(
        helper_ty,
        "MAX",
        wk.int,
        Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL,
    );
    let helper = fx.field(e, "helper", helper_ty, Modifiers::PRIVATE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(
        TypeDecl::new(e)
            .field(helper, None)
            .method(get, vec![ret(Some(qualified(var(helper), max)))]),
    ));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    // The first `helper` is the declaration itself.
    let use_site = find_nodes(tree, SyntaxKind::SimpleName, "helper")[1];
    let problems = vec![
        ProblemLocation::at_node(ProblemKind::UnqualifiedFieldAccess, tree, use_site),
        problem_at(
            tree,
            ProblemKind::NonStaticAccessToStaticField,
            SyntaxKind::QualifiedName,
            "helper.MAX",
        ),
    ];

    let fix = create_clean_up_for_problems(&project, &file, &problems, true, true, false)
        .expect("the static access should be converted");
    assert_eq!(fix.operations().len(), 1);
    assert!(matches!(
        fix.operations()[0],
        RewriteOperation::ToStaticAccess { .. }
    ));
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

public class E {
    private Helper helper;
    int get() {
        return Helper.MAX;
    }
}
"#
    );
}

#[test]
fn indirect_access_imports_the_declaring_type() {
    let mut fx = ProjectFixture::new();
    let util = fx.class("q", "Util");
    let local_ty = fx.class("p", "Local");
    fx.extends(local_ty, util);
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let max = fx.field(util, "MAX", wk.int, Modifiers::PUBLIC | Modifiers::STATIC);
    let get = fx.method(e, "max", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(Unit::new("E.java").package("p").ty(
        TypeDecl::new(e).method(get, vec![ret(Some(qualified(type_name(local_ty), max)))]),
    ));
    let project = fx.into_project();
    let tree = project.unit(&file).unwrap();
    let problems = vec![problem_at(
        tree,
        ProblemKind::IndirectAccessToStaticField,
        SyntaxKind::QualifiedName,
        "Local.MAX",
    )];

    // Indirect accesses are only converted when asked for.
    let fix = create_clean_up(
        &project,
        &file,
        &problems,
        options(|o| o.change_non_static_access_to_static = true),
    );
    assert_eq!(fix, None);

    let fix = create_clean_up(
        &project,
        &file,
        &problems,
        options(|o| o.change_indirect_static_access_to_direct = true),
    )
    .expect("indirect access should be converted");
    assert_eq!(
        apply(&project, &fix),
        r#"package p;

import q.Util;

public class E {
    int max() {
        return Util.MAX;
    }
}
"#
    );
}

#[test]
fn all_flags_off_produces_no_fix() {
    let mut fx = ProjectFixture::new();
    let e = fx.class("p", "E");
    let wk = fx.wk();
    let count = fx.field(e, "count", wk.int, Modifiers::NONE);
    let get = fx.method(e, "get", &[], Some(wk.int), Modifiers::NONE);
    let file = fx.write_unit(
        Unit::new("E.java")
            .package("p")
            .ty(TypeDecl::new(e).field(count, None).method(get, vec![ret(Some(var(count)))])),
    );
    let project = fx.into_project();

    assert_eq!(create_clean_up(&project, &file, &[], CodeStyleOptions::default()), None);
    assert_eq!(
        create_clean_up_for_problems(&project, &file, &[], false, false, false),
        None
    );
}
