use approx::assert_relative_eq;
use hesabu_solve::{Error, ErrorKind, Solution, Solver, Value};

fn solver(equations: &[(&str, &str)]) -> Solver {
    let mut solver = Solver::new();
    for &(name, expression) in equations {
        solver.add(name, expression).unwrap();
    }
    solver
}

fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|entry| entry == name)
        .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
}

#[test]
fn simple_dependency() {
    let solution = solver(&[("a", "1"), ("b", "a+1")]).solve().unwrap();

    assert_eq!(
        solution,
        Solution::from([("a".into(), Value::from(1)), ("b".into(), Value::from(2))])
    );
}

#[test]
fn direct_cycle() {
    let error = solver(&[("a", "b"), ("b", "a")]).solve().unwrap_err();

    let Error::Cycle { names } = &error else {
        panic!("expected a cycle, got {error:?}");
    };
    assert!(names.contains(&"a".to_string()));
    assert!(names.contains(&"b".to_string()));
    assert_eq!(
        error.to_string(),
        r#"There's a cycle between the variables : ["a", "b"]"#
    );
}

#[test]
fn longer_cycle_lists_only_its_members() {
    let solver = solver(&[("start", "a"), ("a", "b"), ("b", "c"), ("c", "a")]);

    assert_eq!(
        solver.solving_order().unwrap_err(),
        Error::Cycle {
            names: vec!["a".into(), "b".into(), "c".into()],
        }
    );
}

#[test]
fn unbound_variable() {
    let error = solver(&[("a", "b+1")]).solve().unwrap_err();

    assert_eq!(
        error,
        Error::UnboundVariable {
            name: "b".into(),
            used_by: "a".into(),
            expression: "b+1".into(),
        }
    );
    assert_eq!(error.to_string(), "Unbound variable : b used by a (b+1)");
}

#[test]
fn diamond() {
    let mut solver = solver(&[("a", "1"), ("b", "a+1"), ("c", "a+2"), ("d", "b+c")]);

    let order = solver.solving_order().unwrap();
    assert!(position(&order, "a") < position(&order, "b"));
    assert!(position(&order, "a") < position(&order, "c"));
    assert!(position(&order, "b") < position(&order, "d"));
    assert!(position(&order, "c") < position(&order, "d"));

    let solution = solver.solve().unwrap();
    let expected: Vec<(&str, Value)> = vec![
        ("a", Value::from(1)),
        ("b", Value::from(2)),
        ("c", Value::from(3)),
        ("d", Value::from(5)),
    ];
    for (name, value) in expected {
        assert_eq!(solution[name], value, "value of {name}");
    }
}

#[test]
fn order_follows_registration_when_unconstrained() {
    let solver = solver(&[("z", "1"), ("y", "z * 2"), ("x", "3"), ("w", "x + y")]);
    assert_eq!(solver.solving_order().unwrap(), vec!["z", "y", "x", "w"]);
}

#[test]
fn dependencies_precede_dependents() {
    let equations = [
        ("total", "SUM(north, south, east)"),
        ("east", "west * 2"),
        ("north", "IF(east > 10, east, 10)"),
        ("west", "7"),
        ("south", "SAFE_DIV(north, west)"),
        ("ratio", "ROUND(total / west, 3)"),
    ];
    let solver = solver(&equations);
    let order = solver.solving_order().unwrap();

    assert_eq!(order.len(), equations.len());
    for equation in solver.equations() {
        for dependency in equation.dependencies() {
            assert!(
                position(&order, dependency) < position(&order, equation.name()),
                "{dependency} should come before {}",
                equation.name()
            );
        }
    }
}

#[test]
fn fresh_solvers_give_identical_results() {
    let equations = [
        ("rate", "0.07"),
        ("base", "1234.5678"),
        ("tax", "base * rate"),
        ("share", "tax / 3"),
        ("total", "base + tax"),
    ];

    let first = solver(&equations).solve().unwrap();
    let second = solver(&equations).solve().unwrap();

    assert_eq!(first, second);
    for (name, value) in &first {
        assert_eq!(value.to_string(), second[name].to_string());
    }
}

#[test]
fn solving_twice_gives_the_same_result() {
    let mut solver = solver(&[("a", "2"), ("b", "a ^ 3"), ("c", "IF(b > 5, b - a, 0)")]);

    let first = solver.solve().unwrap();
    let second = solver.solve().unwrap();

    assert_eq!(first, second);
    assert_eq!(second["c"], Value::from(6));
}

#[test]
fn solving_again_after_a_failure() {
    let mut solver = solver(&[("a", "0"), ("b", "10 / a")]);
    assert_eq!(solver.solve().unwrap_err().kind(), ErrorKind::Evaluation);

    solver.add("a", "4").unwrap();
    let solution = solver.solve().unwrap();
    assert_eq!(solution["b"].to_string(), "2.5");
}

#[test]
fn missing_arguments_leave_registry_untouched() {
    let mut solver = Solver::new();

    assert_eq!(
        solver.add(None::<&str>, "1").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
    assert_eq!(
        solver.add("a", None::<&str>).unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
    assert!(solver.is_empty());
}

#[test]
fn evaluation_failure_names_the_equation() {
    let mut solver = solver(&[("flag", "1 < 2"), ("broken", "flag + 1")]);

    let error = solver.solve().unwrap_err();
    assert_eq!(
        error.to_string(),
        "Failed to evaluate broken due to expected a number but found true in formula flag + 1"
    );
}

#[test]
fn long_dependency_chain() {
    let mut solver = Solver::new();
    solver.add("x0", "0.5").unwrap();
    for i in 1..5_000 {
        solver.add(format!("x{i}").as_str(), format!("x{} + 1", i - 1).as_str()).unwrap();
    }

    let solution = solver.solve().unwrap();
    assert_eq!(solution.len(), 5_000);
    assert_relative_eq!(solution["x4999"].to_f64().unwrap(), 4999.5);
}

#[test]
fn reverse_registered_chain() {
    let mut solver = Solver::new();
    for i in (1..1_000).rev() {
        solver.add(format!("x{i}").as_str(), format!("x{} * 1.01", i - 1).as_str()).unwrap();
    }
    solver.add("x0", "100").unwrap();

    let order = solver.solving_order().unwrap();
    assert_eq!(order.first().map(String::as_str), Some("x0"));
    assert_eq!(order.last().map(String::as_str), Some("x999"));

    let solution = solver.solve().unwrap();
    assert_relative_eq!(
        solution["x999"].to_f64().unwrap(),
        100.0 * 1.01f64.powi(999),
        max_relative = 1e-9
    );
}

#[test]
fn long_formula() {
    let sum = vec!["1"; 20_000].join(" + ");
    let product = vec!["x"; 20_000].join(" * ");
    let mut solver = solver(&[("total", sum.as_str()), ("x", "1"), ("product", product.as_str())]);

    let solution = solver.solve().unwrap();
    assert_eq!(solution["total"], Value::from(20_000));
    assert_eq!(solution["product"], Value::from(1));
}

#[test]
fn deeply_nested_formula_is_a_parse_error() {
    let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let error = Solver::new().add("a", nested.as_str()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Parse);

    let negated = format!("{}1", "-".repeat(10_000));
    let error = Solver::new().add("a", negated.as_str()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Parse);
}

#[test]
fn huge_exponents_stay_compact() {
    let mut solver = solver(&[("a", "1e2000000000"), ("b", "FLOOR(a)")]);

    let solution = solver.solve().unwrap();
    for name in ["a", "b"] {
        let (digits, scale) = solution[name].as_number().unwrap().as_bigint_and_exponent();
        assert_eq!(digits.to_string(), "1");
        assert_eq!(scale, -2_000_000_000);
    }
}

#[test]
fn rounding_to_absurd_precision_fails() {
    let error = solver(&[("a", "ROUND(1, 2000000000)")]).solve().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Evaluation);
}
