/// A ternary expression.  Rust's `if` is already an expression, but
/// `cargo fmt` spreads every one of them across five lines, and the
/// border rules of a 3x3 kernel are a table of small conditions that
/// read much better on one line each.
#[macro_export]
macro_rules! cq {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition {
            $_true
        } else {
            $_false
        }
    };
}
