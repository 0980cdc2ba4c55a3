use as_syntax::parser::parse_plan;
use as_syntax::{Plan, Pred};
use proptest::prelude::*;

fn functor() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "go", "move", "at", "ready"])
}

fn arg() -> impl Strategy<Value = String> {
    prop_oneof![
        functor().prop_map(str::to_string),
        (0u32..100).prop_map(|n| n.to_string()),
        prop::sample::select(vec!["X", "Y", "_"]).prop_map(str::to_string),
        "[a-z]{0,4}".prop_map(|s| format!("\"{}\"", s)),
    ]
}

fn literal() -> impl Strategy<Value = String> {
    (functor(), prop::collection::vec(arg(), 0..3)).prop_map(|(f, args)| {
        if args.is_empty() {
            f.to_string()
        } else {
            format!("{}({})", f, args.join(", "))
        }
    })
}

fn context() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        literal(),
        (literal(), literal()).prop_map(|(a, b)| format!("{} & not {}", a, b)),
        (literal(), literal(), literal()).prop_map(|(a, b, c)| format!("({} | {}) & {}", a, b, c)),
        (0u32..10).prop_map(|n| format!("X < {}", n)),
    ])
}

fn step() -> impl Strategy<Value = String> {
    (prop::sample::select(vec!["", "!", "!!", "?", "+", "-", "-+", "."]), literal())
        .prop_map(|(prefix, lit)| format!("{}{}", prefix, lit))
}

fn plan_source() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["+", "-"]),
        prop::sample::select(vec!["", "!", "?"]),
        literal(),
        context(),
        prop::collection::vec(step(), 0..4),
    )
        .prop_map(|(op, kind, lit, ctx, steps)| {
            let mut s = format!("{}{}{}", op, kind, lit);
            if let Some(ctx) = ctx {
                s.push_str(&format!(" : {}", ctx));
            }
            if !steps.is_empty() {
                s.push_str(&format!(" <- {}", steps.join("; ")));
            }
            s.push('.');
            s
        })
}

fn parsed(source: &str) -> Plan {
    parse_plan(source).unwrap_or_else(|e| panic!("{}: {}", source, e))
}

proptest! {
    #[test]
    fn rendering_round_trips(source in plan_source()) {
        let plan = parsed(&source);
        let again = parsed(&plan.to_string());
        prop_assert_eq!(&again, &plan);
        prop_assert_eq!(again.to_string(), plan.to_string());
    }

    #[test]
    fn deep_copy_is_equal(source in plan_source()) {
        let plan = parsed(&source);
        prop_assert_eq!(&plan.deep_copy(), &plan);
        prop_assert_eq!(&plan.clone_only_body(), &plan);
    }

    #[test]
    fn equality_ignores_label(source in plan_source(), name in functor()) {
        let plan = parsed(&source);
        let mut labelled = plan.deep_copy();
        labelled.set_label(Some(Pred::new(name)));
        prop_assert_eq!(&labelled, &plan);
        prop_assert_eq!(&plan, &labelled);
    }
}
