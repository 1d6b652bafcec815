use colored::Colorize;

/// Print a success line.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning line.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error line to stderr.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a bold section header preceded by a blank line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print an indented, dimmed hint.
pub fn hint(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// `1 record`, `3 records`.
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
