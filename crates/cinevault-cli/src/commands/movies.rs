use super::context::open_app;
use super::spinner::Spinner;
use crate::output::{movie_card, movie_table, Output};
use color_eyre::Result;

pub async fn run_popular(limit: Option<usize>, output: &Output) -> Result<()> {
    let app = open_app(output).await?;

    let spinner = Spinner::start("Fetching popular movies...", output);
    let result = app.catalog().get_popular_movies().await;
    spinner.finish();

    let mut movies = result?;
    if let Some(limit) = limit {
        movies.truncate(limit);
    }

    output.data(&movies, || {
        if movies.is_empty() {
            println!("No popular movies available right now");
        } else {
            println!("{}", movie_table(&movies));
        }
    });
    Ok(())
}

pub async fn run_search(query: String, output: &Output) -> Result<()> {
    let app = open_app(output).await?;

    let spinner = Spinner::start(format!("Searching for \"{}\"...", query.trim()), output);
    let result = app.catalog().search_movies(&query).await;
    spinner.finish();

    let movies = result?;
    output.data(&movies, || {
        if movies.is_empty() {
            println!("No movies match \"{}\"", query.trim());
        } else {
            println!("{}", movie_table(&movies));
        }
    });
    Ok(())
}

pub async fn run_details(id: String, output: &Output) -> Result<()> {
    let app = open_app(output).await?;

    let spinner = Spinner::start(format!("Loading {}...", id), output);
    let result = app.catalog().get_details(&id).await;
    spinner.finish();

    let movie = result?;
    let watched = app.lists().is_movie_watched(&movie.id);
    let want = app.lists().is_movie_want_to_watch(&movie.id);
    let favorite = app.lists().is_favorite(&movie.id);

    output.data(
        &serde_json::json!({
            "movie": movie,
            "watched": watched,
            "want_to_watch": want,
            "favorite": favorite,
        }),
        || {
            println!("{}", movie_card(&movie));
            let mut marks = Vec::new();
            if watched {
                marks.push("watched");
            }
            if want {
                marks.push("on your want-to-watch list");
            }
            if favorite {
                marks.push("a favorite");
            }
            if !marks.is_empty() {
                println!("\nThis movie is {}.", marks.join(", "));
            }
        },
    );
    Ok(())
}
