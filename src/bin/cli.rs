//! A small terminal REPL driving an in-process `OrderBook` directly, with
//! no HTTP transport involved.

use clap::{Parser, Subcommand, builder::PossibleValuesParser};
use matching_core::orderbook::OrderBook;
use matching_core::orders::Side;

#[derive(Parser)]
#[command(name = "matching-engine-cli")]
#[command(author, version, about = "Drive an order book from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rest a limit order, crossing the opposite side first if marketable.
    Limit {
        #[arg(value_parser = PossibleValuesParser::new(["buy", "sell"]))]
        side: String,
        price: u64,
        size: u64,
    },
    /// Fill a market order against the opposite side.
    Market {
        #[arg(value_parser = PossibleValuesParser::new(["buy", "sell"]))]
        side: String,
        size: u64,
    },
    /// Print the current book.
    Book,
}

fn parse_side(s: &str) -> Side {
    match s {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        _ => unreachable!("clap restricts to buy|sell"),
    }
}

fn print_book(book: &OrderBook) {
    println!("asks (best first):");
    for limit in book.snapshot(Side::Sell) {
        let total: u64 = limit.orders.iter().map(|o| o.size).sum();
        println!("  {:>10} x {}", limit.price, total);
    }
    println!("bids (best first):");
    for limit in book.snapshot(Side::Buy) {
        let total: u64 = limit.orders.iter().map(|o| o.size).sum();
        println!("  {:>10} x {}", limit.price, total);
    }
}

fn main() {
    let cli = Cli::parse();
    let mut book = OrderBook::new();

    match cli.command {
        Commands::Limit { side, price, size } => {
            let matches = book.place_limit_order(parse_side(&side), size, price);
            println!("{} match(es)", matches.len());
            for m in matches {
                println!("  {:?}", m);
            }
            print_book(&book);
        }
        Commands::Market { side, size } => match book.place_market_order(parse_side(&side), size) {
            Ok(matches) => {
                println!("{} match(es)", matches.len());
                for m in matches {
                    println!("  {:?}", m);
                }
            }
            Err(e) => println!("rejected: {e}"),
        },
        Commands::Book => print_book(&book),
    }
}
