// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: literals, consts, vars, format results
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! row {
    // Table row shorthand: row!["a", b, c.to_string()] → Vec<String>
    () => {
        ::std::vec::Vec::<::std::string::String>::new()
    };
    ($($cell:expr),+ $(,)?) => {
        ::std::vec![$( ::std::string::String::from($cell) ),+]
    };
}
