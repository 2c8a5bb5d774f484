//! Catalog statistics command.

use console::style;

use crate::config::Settings;

/// Print catalog totals from the database.
pub async fn cmd_stats(settings: &Settings) -> anyhow::Result<()> {
    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let games = ctx.games();
    let categories = ctx.categories().list_with_counts().await?;

    println!("{}", style("Catalog").bold());
    println!("  Active games:   {}", games.count_active().await?);
    println!("  Featured games: {}", games.count_featured().await?);
    println!("  New games:      {}", games.count_new().await?);
    println!("  Total plays:    {}", games.total_plays().await?);
    println!("  Categories:     {}", categories.len());

    if !categories.is_empty() {
        println!();
        println!("{}", style("Categories").bold());
        for (category, count) in &categories {
            println!("  {:<20} {:>5} games", category.name, count);
        }
    }

    let popular = games.popular(5).await?;
    if !popular.is_empty() {
        println!();
        println!("{}", style("Most played").bold());
        for game in &popular {
            println!(
                "  {} {} ({} plays)",
                style("→").cyan(),
                game.title,
                game.total_plays
            );
        }
    }

    Ok(())
}
