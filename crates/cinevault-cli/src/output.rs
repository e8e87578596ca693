use clap::ValueEnum;
use cinevault_models::{Movie, WatchedMovie};
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Everything user-facing goes through here; logs go to stderr separately
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            _ => self.message("success", msg.as_ref()),
        }
    }

    /// Shown even in quiet mode
    pub fn error(&self, msg: impl AsRef<str>) {
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.message("error", msg.as_ref()),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            _ => self.message("info", msg.as_ref()),
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            _ => self.message("warning", msg.as_ref()),
        }
    }

    /// Structured result: serialized as-is in JSON modes, `human` renders it otherwise
    pub fn data<T: Serialize + ?Sized>(&self, value: &T, human: impl FnOnce()) {
        match self.format {
            OutputFormat::Human => {
                if !self.quiet {
                    human();
                }
            }
            _ => match serde_json::to_value(value) {
                Ok(json) => self.print_json(&json),
                Err(e) => self.error(format!("Failed to encode output: {}", e)),
            },
        }
    }

    fn message(&self, kind: &str, msg: &str) {
        self.print_json(&json!({ "type": kind, "message": msg }));
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            _ => println!("{}", serde_json::to_string(data).unwrap_or_default()),
        }
    }
}

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold)),
    );
    table
}

pub fn movie_table(movies: &[Movie]) -> Table {
    let mut table = styled_table(&["ID", "Title", "Year", "Rating"]);
    for movie in movies {
        table.add_row(vec![
            Cell::new(&movie.id),
            Cell::new(&movie.title),
            Cell::new(movie.year.as_deref().unwrap_or("")),
            Cell::new(&movie.rating),
        ]);
    }
    table
}

pub fn watched_table(movies: &[WatchedMovie]) -> Table {
    let mut table = styled_table(&["ID", "Title", "Year", "Rating", "Your rating"]);
    for entry in movies {
        table.add_row(vec![
            Cell::new(&entry.movie.id),
            Cell::new(&entry.movie.title),
            Cell::new(entry.movie.year.as_deref().unwrap_or("")),
            Cell::new(&entry.movie.rating),
            Cell::new(entry.user_rating.to_string()).fg(Color::Green),
        ]);
    }
    table
}

/// Multi-line description of one movie
pub fn movie_card(movie: &Movie) -> String {
    let mut lines = vec![format!("{}", movie.title.bold().bright_cyan())];
    let mut facts = vec![movie.id.clone()];
    if let Some(year) = &movie.year {
        facts.push(year.clone());
    }
    facts.push(format!("rating {}", movie.rating));
    lines.push(facts.join(" · ").dimmed().to_string());
    if let Some(plot) = &movie.plot {
        lines.push(String::new());
        lines.push(plot.clone());
    }
    if let Some(image) = &movie.image {
        lines.push(String::new());
        lines.push(format!("Poster: {}", image));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinevault_models::UserRating;

    #[test]
    fn test_tables_list_every_movie() {
        let movies = vec![
            Movie::new("tt0111161", "The Shawshank Redemption").with_year("1994"),
            Movie::new("tt0068646", "The Godfather"),
        ];
        let rendered = movie_table(&movies).to_string();
        assert!(rendered.contains("The Shawshank Redemption"));
        assert!(rendered.contains("tt0068646"));
        assert!(rendered.contains("N/A"));

        let watched = vec![WatchedMovie::new(movies[0].clone(), UserRating::new(7.5).unwrap())];
        assert!(watched_table(&watched).to_string().contains("7.5"));
    }

    #[test]
    fn test_movie_card_includes_plot() {
        let movie = Movie::new("tt1375666", "Inception").with_plot("A thief who steals secrets.");
        let card = movie_card(&movie);
        assert!(card.contains("tt1375666"));
        assert!(card.contains("A thief who steals secrets."));
    }
}
