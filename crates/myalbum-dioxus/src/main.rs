use myalbum_config::Config;
use myalbum_engine::Navigator;

mod platform;
mod ui;

use ui::{App, AppSettings};

/// Write the default config and create the album folder on first start
#[cfg(target_os = "android")]
fn create_default_android_config() -> Config {
    let config = Config::android_default();
    log::info!("Default album root: {}", config.root_path.display());

    // Config goes in app's internal storage (no permissions needed)
    match config.save() {
        Ok(()) => log::info!(
            "Created default config file at {}",
            Config::config_path().display()
        ),
        Err(e) => {
            log::warn!("Failed to create default config file: {e}");
            log::warn!("Will use the default album root without persisting config");
        }
    }
    config
}

#[cfg(not(target_os = "android"))]
fn usage_and_exit() -> ! {
    let program_name = std::env::args()
        .next()
        .unwrap_or_else(|| "myalbum".to_string());
    eprintln!("Usage: {program_name} [album-folder-path]");
    eprintln!("Or create a config file at {}", Config::config_path().display());
    std::process::exit(1);
}

/// CLI argument first, then the config file
#[cfg(not(target_os = "android"))]
fn load_config() -> (Config, bool) {
    let args: Vec<String> = std::env::args().collect();
    match args.as_slice() {
        [_, root] => {
            log::info!("Using album root from CLI argument: {root}");
            // Capture settings still come from the config file when there is one
            let mut config = Config::load()
                .ok()
                .flatten()
                .unwrap_or_else(|| Config::new(root));
            config.root_path = root.into();
            (config, false)
        }
        [_] => match Config::load() {
            Ok(Some(config)) => (config, true),
            Ok(None) => {
                eprintln!("Error: No album path provided and no config file found");
                usage_and_exit();
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                usage_and_exit();
            }
        },
        _ => usage_and_exit(),
    }
}

// On Android, env::args() can cause capacity overflow, and apps get no CLI args anyway
#[cfg(target_os = "android")]
fn load_config() -> (Config, bool) {
    match Config::load() {
        Ok(Some(config)) => (config, true),
        Ok(None) => (create_default_android_config(), true),
        Err(e) => {
            log::error!("Config::load() failed: {e}, falling back to defaults");
            (Config::android_default(), false)
        }
    }
}

fn main() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("MyAlbum"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("myalbum starting up!");

    let (config, from_config) = load_config();

    // On Android the album folder is ours to create
    #[cfg(target_os = "android")]
    {
        if !config.root_path.exists() {
            match std::fs::create_dir_all(&config.root_path) {
                Ok(()) => log::info!("Created album folder {}", config.root_path.display()),
                // Storage access may simply not be granted yet; the permission screen handles it
                Err(e) => log::warn!("Failed to create album folder: {e}"),
            }
        }
    }

    #[cfg(not(target_os = "android"))]
    if let Err(e) = Navigator::open(&config.root_path) {
        let source = if from_config {
            format!(" from config file '{}'", Config::config_path().display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Album path '{}'{source} is invalid: {e}",
            config.root_path.display()
        );
        std::process::exit(1);
    }

    #[cfg(target_os = "android")]
    if let Err(e) = Navigator::open(&config.root_path) {
        log::warn!(
            "Album root {} (from config: {from_config}) not readable yet: {e}",
            config.root_path.display()
        );
    }

    let settings = AppSettings {
        root: config.root_path,
        capture: config.capture,
    };

    #[cfg(not(target_os = "android"))]
    {
        log::info!("Launching Dioxus app for desktop");
        dioxus::LaunchBuilder::desktop()
            .with_cfg(make_window_config())
            .with_context(settings)
            .launch(App);
    }

    #[cfg(target_os = "android")]
    {
        log::info!("Launching Dioxus app for Android");
        dioxus::LaunchBuilder::new().with_context(settings).launch(App);
    }
}

#[cfg(not(target_os = "android"))]
fn make_window_config() -> dioxus::desktop::Config {
    use dioxus::desktop::{Config, WindowBuilder};

    let window = WindowBuilder::new()
        .with_title("MyAlbum")
        .with_always_on_top(false);

    Config::default().with_window(window)
}
