use anyhow::{anyhow, Context, Result};
use catalog::{load_catalog, CatalogStore, MovieId, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{MovieRecommendation, RecommendationService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// FlickPick - Movie catalog browsing and personalized recommendations
#[derive(Parser)]
#[command(name = "flickpick")]
#[command(about = "Personalized movie recommendations over a JSON catalog", long_about = None)]
struct Cli {
    /// Path to the catalog seed file
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value_t = engine::DEFAULT_RECOMMENDATION_LIMIT)]
        limit: usize,

        /// Address of a remote scoring service; scores locally when absent
        #[arg(long)]
        scorer: Option<String>,
    },

    /// Find movies similar to a target movie
    Similar {
        /// Movie ID to find neighbors for
        #[arg(long)]
        movie_id: MovieId,

        /// Number of similar movies to return
        #[arg(long, default_value_t = engine::DEFAULT_SIMILAR_LIMIT)]
        limit: usize,
    },

    /// Submit or overwrite a rating
    Rate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        movie_id: MovieId,

        /// Rating value on the 0-5 scale
        #[arg(long)]
        rating: f32,

        /// Optional review text
        #[arg(long)]
        review: Option<String>,
    },

    /// Show a user's favorites, ratings, and preference vector
    Profile {
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for movies by title (case-insensitive substring match)
    Search {
        #[arg(long)]
        title: String,
    },

    /// Show a user's watchlist, or add/remove a movie on it
    Watchlist {
        #[arg(long)]
        user_id: UserId,

        /// Movie ID to add to the watchlist
        #[arg(long, conflicts_with = "remove")]
        add: Option<MovieId>,

        /// Movie ID to remove from the watchlist
        #[arg(long)]
        remove: Option<MovieId>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let store = load_catalog(&cli.catalog).context("Failed to load catalog")?;
    println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            scorer,
        } => handle_recommend(store, user_id, limit, scorer).await?,
        Commands::Similar { movie_id, limit } => handle_similar(store, movie_id, limit).await?,
        Commands::Rate {
            user_id,
            movie_id,
            rating,
            review,
        } => handle_rate(store, user_id, movie_id, rating, review)?,
        Commands::Profile { user_id } => handle_profile(&store, user_id)?,
        Commands::Search { title } => handle_search(&store, title)?,
        Commands::Watchlist {
            user_id,
            add,
            remove,
        } => handle_watchlist(store, user_id, add, remove)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    store: CatalogStore,
    user_id: UserId,
    limit: usize,
    scorer: Option<String>,
) -> Result<()> {
    let store = Arc::new(store);
    let service = match scorer {
        Some(addr) => RecommendationService::with_remote_scorer(store, addr).await?,
        None => RecommendationService::new(store),
    };

    let recommendations = service.recommendations(user_id, limit).await?;
    if recommendations.is_empty() {
        println!("No recommendations for user {} (nothing unrated?)", user_id);
        return Ok(());
    }

    print_ranked("Recommendations", &recommendations);
    Ok(())
}

/// Handle the 'similar' command
async fn handle_similar(store: CatalogStore, movie_id: MovieId, limit: usize) -> Result<()> {
    let store = Arc::new(store);
    let target = store
        .get_movie(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?
        .title
        .clone();

    let service = RecommendationService::new(store);
    let results = service.similar(movie_id, limit).await?;

    print_ranked(&format!("Similar to {}", target), &results);
    Ok(())
}

/// Handle the 'rate' command
fn handle_rate(
    mut store: CatalogStore,
    user_id: UserId,
    movie_id: MovieId,
    rating: f32,
    review: Option<String>,
) -> Result<()> {
    store
        .upsert_rating(user_id, movie_id, rating, review)
        .context("Failed to store rating")?;

    let movie = store
        .get_movie(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?;
    println!(
        "{} {} now averages {:.2} over {} ratings",
        "✓".green(),
        movie.title.bold(),
        movie.average_rating,
        movie.rating_count
    );
    Ok(())
}

/// Handle the 'profile' command
fn handle_profile(store: &CatalogStore, user_id: UserId) -> Result<()> {
    let ratings = store.ratings_for_user(user_id);
    let favorites = store.favorite_genres(user_id);
    if ratings.is_empty() && favorites.is_empty() {
        return Err(anyhow!("No profile data for user {}", user_id));
    }

    println!("{}", format!("User {}", user_id).bold().blue());
    println!(
        "{}Favorite genres: {}",
        "• ".green(),
        if favorites.is_empty() {
            "(none)".to_string()
        } else {
            favorites.join(", ")
        }
    );
    println!("{}Ratings: {}", "• ".green(), ratings.len());

    for rating in ratings {
        if let Some(movie) = store.get_movie(rating.movie_id) {
            match &rating.review {
                Some(review) => {
                    println!("  - {} — {:.1} ({})", movie.title, rating.rating, review)
                }
                None => println!("  - {} — {:.1}", movie.title, rating.rating),
            }
        }
    }

    // Snapshot of the preference vector this user's requests would use
    let prefs = engine::build_preferences(ratings, favorites, store);
    if prefs.is_empty() {
        println!("{}Preference vector: empty", "• ".cyan());
    } else {
        println!("{}Preference vector:", "• ".cyan());
        for (genre, weight) in prefs.snapshot() {
            println!("  - {}: {:.3}", genre, weight);
        }
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(store: &CatalogStore, title: String) -> Result<()> {
    let needle = title.to_lowercase();

    // Exact matches first, then substring matches, each by rating
    let mut matches: Vec<(&catalog::Movie, u8)> = store
        .movies()
        .iter()
        .filter_map(|movie| {
            let haystack = movie.title.to_lowercase();
            if haystack == needle {
                Some((movie, 0))
            } else if haystack.contains(&needle) {
                Some((movie, 1))
            } else {
                None
            }
        })
        .collect();
    matches.sort_by(|a, b| {
        a.1.cmp(&b.1).then_with(|| {
            b.0.average_rating
                .partial_cmp(&a.0.average_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for (movie, _) in matches.iter().take(20) {
        println!(
            "{}: {} ({}) [{}] avg {:.2} ({} ratings)",
            movie.id,
            movie.title,
            movie.year,
            movie.genres.join(", "),
            movie.average_rating,
            movie.rating_count
        );
    }
    if matches.is_empty() {
        println!("(no matches)");
    }
    Ok(())
}

/// Handle the 'watchlist' command
fn handle_watchlist(
    mut store: CatalogStore,
    user_id: UserId,
    add: Option<MovieId>,
    remove: Option<MovieId>,
) -> Result<()> {
    if let Some(movie_id) = add {
        store
            .add_to_watchlist(user_id, movie_id)
            .context("Failed to update watchlist")?;
        println!("{} Added movie {} to the watchlist", "✓".green(), movie_id);
    }
    if let Some(movie_id) = remove {
        store.remove_from_watchlist(user_id, movie_id);
        println!("{} Removed movie {} from the watchlist", "✓".green(), movie_id);
    }

    let watchlist = store.watchlist(user_id);
    println!("{}", format!("Watchlist for user {}:", user_id).bold().blue());
    if watchlist.is_empty() {
        println!("(empty)");
        return Ok(());
    }
    for movie_id in watchlist {
        if let Some(movie) = store.get_movie(*movie_id) {
            println!(
                "{}: {} ({}) [{}]",
                movie.id,
                movie.title,
                movie.year,
                movie.genres.join(", ")
            );
        }
    }
    Ok(())
}

/// Helper to format and print a ranked list
fn print_ranked(header: &str, results: &[MovieRecommendation]) {
    println!("{}", format!("{}:", header).bold().blue());
    for (rank, rec) in results.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - Score: {:.3}",
            (rank + 1).to_string().green(),
            rec.title,
            rec.year,
            rec.genres.join(", "),
            rec.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_come_from_the_engine() {
        let cli = Cli::try_parse_from(["flickpick", "recommend", "--user-id", "1"]).unwrap();
        match cli.command {
            Commands::Recommend { limit, .. } => {
                assert_eq!(limit, engine::DEFAULT_RECOMMENDATION_LIMIT)
            }
            _ => panic!("parsed the wrong subcommand"),
        }

        let cli = Cli::try_parse_from(["flickpick", "similar", "--movie-id", "1"]).unwrap();
        match cli.command {
            Commands::Similar { limit, .. } => assert_eq!(limit, engine::DEFAULT_SIMILAR_LIMIT),
            _ => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn watchlist_add_and_remove_are_exclusive() {
        let result = Cli::try_parse_from([
            "flickpick",
            "watchlist",
            "--user-id",
            "1",
            "--add",
            "2",
            "--remove",
            "3",
        ]);
        assert!(result.is_err());
    }
}
