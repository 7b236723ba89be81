use forkify::{open_configured_store, Store, StoreError};
use log::error;
use serde_json::json;
use std::env;

const USAGE: &str = "Usage:
    forkify recipe <id> [servings]
    forkify search <query> [page]
    forkify bookmarks
    forkify bookmark <id>
    forkify unbookmark <id>
    forkify clear-bookmarks
    forkify upload title=... sourceUrl=... image=... publisher=... cookingTime=... servings=... ingredient-1=qty,unit,description ...";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().ok_or(USAGE)?;

    let store = open_configured_store()?;

    let output = match run(&store, command, &args[1..]).await {
        Ok(output) => output,
        Err(e) => {
            error!("{} failed: {}", command, e);
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(
    store: &Store,
    command: &str,
    args: &[String],
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let value = match command {
        "recipe" => {
            let id = args.first().ok_or(USAGE)?;
            store.load_recipe(id).await?;
            if let Some(servings) = args.get(1) {
                let servings: u32 = servings.parse()?;
                if servings < 1 {
                    return Err("servings must be at least 1".into());
                }
                store.update_servings(servings)?;
            }
            json!(store.recipe())
        }
        "search" => {
            let query = args.first().ok_or(USAGE)?;
            store.load_search_results(query).await?;
            let page = match args.get(1) {
                Some(page) => page.parse()?,
                None => 1,
            };
            let results = store.search_results_page(page);
            json!({
                "query": query,
                "pagination": store.pagination(),
                "results": results,
            })
        }
        "bookmarks" => json!(store.bookmarks()),
        "bookmark" => {
            let id = args.first().ok_or(USAGE)?;
            store.load_recipe(id).await?;
            let recipe = store.recipe().ok_or(StoreError::NoRecipe)?;
            store.add_bookmark(&recipe)?;
            json!({ "id": id, "bookmarked": true })
        }
        "unbookmark" => {
            let id = args.first().ok_or(USAGE)?;
            store.delete_bookmark(id)?;
            json!({ "id": id, "bookmarked": false })
        }
        "clear-bookmarks" => {
            store.clear_bookmarks()?;
            json!([])
        }
        "upload" => {
            let fields = args
                .iter()
                .map(|arg| {
                    arg.split_once('=')
                        .ok_or_else(|| StoreError::Validation(format!("expected name=value, got '{}'", arg)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            json!(store.upload_recipe(&fields).await?)
        }
        _ => return Err(USAGE.into()),
    };

    Ok(value)
}
