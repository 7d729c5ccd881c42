use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static STYLES: OnceLock<Styles> = OnceLock::new();

struct Styles {
    header: Style,
    success: Style,
    warn: Style,
    info: Style,
    dim: Style,
    muted: Style,
}

impl Styles {
    /// Colored on a terminal unless `NO_COLOR` is set
    fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(!no_color && console::Term::stdout().is_term())
    }

    fn new(colored: bool) -> Self {
        if !colored {
            return Self {
                header: Style::new(),
                success: Style::new(),
                warn: Style::new(),
                info: Style::new(),
                dim: Style::new(),
                muted: Style::new(),
            };
        }
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
        }
    }
}

fn styles() -> &'static Styles {
    STYLES.get_or_init(Styles::detect)
}

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(styles().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(styles().success.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(styles().info.clone()),
        label.style(styles().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(styles().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(styles().dim.clone()).to_string()
}

pub fn relation_present(name: &str, rows: usize) {
    println!("{} {} {}", Icons::NEW.style(styles().success.clone()), name, dim(&format!("({} rows)", rows)));
}

pub fn relation_missing(name: &str) {
    println!("{} {}", Icons::MISSING.style(styles().warn.clone()), name.style(styles().muted.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_styles_add_no_escapes() {
        let plain = Styles::new(false);
        assert_eq!("blocks".style(plain.header.clone()).to_string(), "blocks");
        assert_eq!("logs".style(plain.muted.clone()).to_string(), "logs");
    }

    #[test]
    fn test_colored_styles_add_escapes() {
        let colored = Styles::new(true);
        assert_ne!("blocks".style(colored.header.clone()).to_string(), "blocks");
    }
}
