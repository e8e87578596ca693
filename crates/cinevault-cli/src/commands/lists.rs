use super::context::{open_app, require_session};
use super::spinner::Spinner;
use crate::output::{movie_table, watched_table, Output};
use crate::{FavoritesCommands, WantCommands, WatchedCommands};
use cinevault_core::App;
use cinevault_models::{Movie, UserRating};
use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Catalog record for `id`, used when adding a movie to a list by id
async fn fetch_movie(app: &App, id: &str, output: &Output) -> Result<Movie> {
    let spinner = Spinner::start(format!("Looking up {}...", id), output);
    let result = app.catalog().get_details(id).await;
    spinner.finish();
    Ok(result?)
}

async fn open_signed_in(output: &Output) -> Result<App> {
    let app = open_app(output).await?;
    let user = require_session(&app)?;
    tracing::debug!(user = %user, "Session active");
    Ok(app)
}

pub async fn run_watched(cmd: WatchedCommands, output: &Output) -> Result<()> {
    let app = open_signed_in(output).await?;
    let lists = app.lists();

    match cmd {
        WatchedCommands::List => {
            let movies = lists.watched_movies();
            output.data(&movies, || {
                if movies.is_empty() {
                    println!("You haven't marked any movies as watched yet");
                } else {
                    println!("{}", watched_table(&movies));
                }
            });
        }
        WatchedCommands::Add { id, rating } => {
            let movie = fetch_movie(&app, &id, output).await?;
            let title = movie.title.clone();
            if lists.add_watched_movie(movie, rating).await {
                output.success(format!("Marked \"{}\" as watched, rated {}/10", title, rating));
            } else {
                output.info(format!("\"{}\" is already on your watched list", title));
            }
        }
        WatchedCommands::Remove { id } => {
            if lists.remove_watched_movie(&id).await {
                output.success(format!("Removed {} from your watched list", id));
            } else {
                output.warn(format!("{} is not on your watched list", id));
            }
        }
        WatchedCommands::Rate { id, rating } => {
            if !lists.is_movie_watched(&id) {
                return Err(eyre!("{} is not on your watched list", id));
            }
            if lists.update_watched_rating(&id, rating).await {
                output.success(format!("Rated {} {}/10", id, rating));
            } else {
                output.info(format!("{} is already rated {}/10", id, rating));
            }
        }
    }
    Ok(())
}

pub async fn run_want(cmd: WantCommands, output: &Output) -> Result<()> {
    let app = open_signed_in(output).await?;
    let lists = app.lists();

    match cmd {
        WantCommands::List => {
            let movies = lists.want_to_watch_movies();
            output.data(&movies, || {
                if lists.is_want_to_watch_empty() {
                    println!("Your want-to-watch list is empty. Add movies with `cinevault want add <id>`.");
                } else {
                    println!("{}", movie_table(&movies));
                }
            });
        }
        WantCommands::Add { id } => {
            let movie = fetch_movie(&app, &id, output).await?;
            let title = movie.title.clone();
            if lists.is_movie_watched(&movie.id) {
                output.warn(format!("\"{}\" is already on your watched list", title));
            }
            if lists.add_want_to_watch_movie(movie).await {
                output.success(format!("Added \"{}\" to your want-to-watch list", title));
            } else {
                output.info(format!("\"{}\" is already on your want-to-watch list", title));
            }
        }
        WantCommands::Remove { id } => {
            if lists.remove_want_to_watch_movie(&id).await {
                output.success(format!("Removed {} from your want-to-watch list", id));
            } else {
                output.warn(format!("{} is not on your want-to-watch list", id));
            }
        }
        WantCommands::Move { id, rating } => {
            let queued = lists.want_to_watch_movies().into_iter().find(|m| m.id == id);
            let movie = match queued {
                Some(movie) => movie,
                None => fetch_movie(&app, &id, output).await?,
            };
            let title = movie.title.clone();
            let existing = lists
                .watched_movies()
                .into_iter()
                .find(|w| w.id() == id)
                .map(|w| w.user_rating);
            lists.move_from_want_to_watch_to_watched(&id, movie, rating).await;
            match existing {
                None => output.success(move_message(&title, rating, None)),
                Some(kept) => output.info(move_message(&title, rating, Some(kept))),
            }
        }
    }
    Ok(())
}

pub async fn run_favorites(cmd: FavoritesCommands, output: &Output) -> Result<()> {
    let app = open_signed_in(output).await?;
    let lists = app.lists();

    match cmd {
        FavoritesCommands::List => {
            let movies = lists.favorites();
            output.data(&movies, || {
                if movies.is_empty() {
                    println!("No favorites yet");
                } else {
                    println!("{}", movie_table(&movies));
                }
            });
        }
        FavoritesCommands::Add { id } => {
            let movie = fetch_movie(&app, &id, output).await?;
            let title = movie.title.clone();
            if lists.add_favorite(movie).await {
                output.success(format!("Added \"{}\" to your favorites", title));
            } else {
                output.info(format!("\"{}\" is already a favorite", title));
            }
        }
        FavoritesCommands::Remove { id } => {
            if lists.remove_favorite(&id).await {
                output.success(format!("Removed {} from your favorites", id));
            } else {
                output.warn(format!("{} is not a favorite", id));
            }
        }
    }
    Ok(())
}

/// Outcome of `want move`; `kept` is the rating of an existing watched entry
fn move_message(title: &str, rating: UserRating, kept: Option<UserRating>) -> String {
    match kept {
        None => format!("Moved \"{}\" to your watched list, rated {}/10", title, rating),
        Some(kept) => format!(
            "\"{}\" was already watched; removed it from want-to-watch and kept your rating of {}/10 (use `cinevault watched rate` to change it)",
            title, kept
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: f64) -> UserRating {
        UserRating::new(value).unwrap()
    }

    #[test]
    fn test_move_message_reports_the_applied_rating() {
        let message = move_message("Heat", rating(7.5), None);
        assert!(message.contains("rated 7.5/10"));
    }

    #[test]
    fn test_move_message_keeps_existing_rating() {
        let message = move_message("Heat", rating(2.0), Some(rating(9.0)));
        assert!(message.contains("kept your rating of 9/10"));
        assert!(!message.contains("2/10"));
    }
}
