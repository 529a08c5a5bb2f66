// Command-line entry point.
// Prints cached or probed file info for each image URL given.

use std::process::ExitCode;

use imgmeta::{Config, FileStorage, MetadataCache, MetadataFetcher, RemoteImage};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: imgmeta [--clear] <url>...";

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imgmeta=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let clear = args.iter().any(|arg| arg == "--clear");
    let urls: Vec<&String> = args.iter().filter(|arg| *arg != "--clear").collect();

    if !clear && urls.is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    let config = Config::from_env();
    let Some(dir) = config.storage_dir.clone() else {
        eprintln!("imgmeta: no cache directory available, set IMGMETA_CACHE_DIR");
        return ExitCode::FAILURE;
    };
    let cache = MetadataCache::from_config(FileStorage::new(dir), &config);

    if clear {
        if let Err(e) = cache.clear() {
            eprintln!("imgmeta: failed to clear cache: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let fetcher = match MetadataFetcher::from_config(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("imgmeta: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for url in urls {
        let image = RemoteImage::new(url.as_str(), &cache, &fetcher);
        match image.file_info().await {
            Ok(info) => println!(
                "{}\t{}\t{}",
                url,
                info.file_type.as_deref().unwrap_or("-"),
                info.size.map_or_else(|| "-".to_string(), |size| size.to_string())
            ),
            Err(e) => {
                eprintln!("{}: {}", url, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
