use super::context::open_app;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;

pub async fn run_clear(output: &Output) -> Result<()> {
    let app = open_app(output).await?;
    app.catalog()
        .clear_popular_cache()
        .await
        .map_err(|e| eyre!("Failed to clear the popular movies cache: {}", e))?;
    output.success("Cleared popular movies cache");
    Ok(())
}
