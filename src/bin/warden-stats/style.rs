//! Terminal styling utilities

const RESET: &str = "\x1b[0m";

fn paint(code: &str, s: &str) -> String {
    format!("\x1b[{}m{}{}", code, s, RESET)
}

pub fn style_cyan(s: &str) -> String {
    paint("36", s)
}

pub fn style_dim(s: &str) -> String {
    paint("2", s)
}

/// `3 high, 1 medium` with the counts colored by severity.
pub fn severity_counts(high: u32, medium: u32) -> String {
    format!(
        "{} high, {} medium",
        paint("31", &high.to_string()),
        paint("33", &medium.to_string())
    )
}

pub fn print_success(msg: &str) {
    println!("{} {}", paint("32", "✓"), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", paint("31", "✗"), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", paint("33", "⚠"), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", style_cyan("ℹ"), msg);
}

/// Bold title underlined to its display width.
pub fn print_header(title: &str) {
    println!();
    println!("{}", paint("1", title));
    println!("{}", "─".repeat(title.chars().count()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_counts_colors_each_count() {
        assert_eq!(
            severity_counts(3, 1),
            "\x1b[31m3\x1b[0m high, \x1b[33m1\x1b[0m medium"
        );
    }
}
