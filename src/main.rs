use sipsa_map::utils::display::DisplayFormatter;
use sipsa_map::{Config, HttpDataLoader, PriceService, SelectionController, SelectionOutcome};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!("Starting SIPSA price map, data from {}", config.data_url());

    let loader = HttpDataLoader::new(&config)?;
    let service = Arc::new(PriceService::with_ttl(loader, config.cache_ttl));
    let controller = SelectionController::new(Arc::clone(&service));
    let display = DisplayFormatter::new();

    match controller.load_products().await {
        Ok(products) => println!("Loaded {} products", products.len()),
        Err(e) => {
            error!("Could not load products: {}", e);
            println!("Could not load the product catalog: {}", e);
        }
    }

    println!("=== Precios Mayoristas SIPSA ===");
    println!("Commands:");
    println!("  list           - Show products");
    println!("  search <text>  - Find products by name");
    println!("  <code>         - Show prices for a product (also: select <code>)");
    println!("  clear          - Clear the selection");
    println!("  cities         - Show cities with coordinates");
    println!("  all            - Count every price record");
    println!("  geojson        - Print the current map as GeoJSON");
    println!("  reload         - Retry loading the product catalog");
    println!("  exit           - Exit the program");

    let mut input = String::new();
    loop {
        input.clear();
        print!("> ");
        io::stdout().flush()?;
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let line = input.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "" => continue,
            "exit" => {
                debug!("Received exit command");
                break;
            }
            "list" => {
                println!("{}", display.format_header("Products"));
                println!("{}", display.format_products(&controller.products()));
            }
            "search" => {
                let hits = controller.search(arg);
                if hits.is_empty() {
                    println!("No products found");
                } else {
                    println!("{}", display.format_products(&hits));
                }
            }
            "clear" => {
                controller.clear_selection();
                println!("{}", display.format_map_view(&controller.map_view()));
            }
            "cities" => {
                let cities = service.list_cities().await?;
                println!("{}", display.format_cities(&cities));
            }
            "all" => {
                let all = service.list_all_prices().await?;
                println!("{} price records", all.len());
            }
            "geojson" => {
                println!("{}", serde_json::to_string_pretty(&controller.map_view().to_geojson())?);
            }
            "reload" => match controller.load_products().await {
                Ok(products) => println!("Loaded {} products", products.len()),
                Err(e) => println!("Could not load the product catalog: {}", e),
            },
            _ => {
                let id = if command == "select" { arg.trim() } else { line };
                debug!("Selecting product {}", id);
                match controller.select_product(id).await {
                    SelectionOutcome::Cleared => println!("Unknown product code: {}", id),
                    _ => println!("{}", display.format_map_view(&controller.map_view())),
                }
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
