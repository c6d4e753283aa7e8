use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use jaws_core::{AppError, BgTransparency, ColorTheme, ConfigError, UnitSystem};
use jaws_weather::{
    coordinates_selector, FixedLocality, MeteoProvider, WeatherCache, WeatherResult,
};

#[derive(Parser)]
#[command(name = "jaws", version, about = "Weather widget backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch current conditions and the daily forecast
    Weather(WeatherArgs),
    /// Inspect or change per-widget display preferences
    Widget {
        #[command(subcommand)]
        action: WidgetAction,
    },
}

#[derive(Args)]
struct WeatherArgs {
    #[arg(long, requires = "lon", conflicts_with = "selector", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Explicit location selector, e.g. "lat=52.52&lon=13.41"
    #[arg(long, required_unless_present = "lat")]
    selector: Option<String>,
    /// Name to show instead of reverse geocoding the location
    #[arg(long)]
    name: Option<String>,
    /// Fahrenheit and mph instead of the configured units
    #[arg(long)]
    imperial: bool,
    /// Ignore a fresh cached result
    #[arg(long)]
    force: bool,
}

#[derive(Subcommand)]
enum WidgetAction {
    Show { id: i32 },
    /// 0 = transparent, 1 = follow system, 2 = dark, 3 = light
    Theme { id: i32, value: i32 },
    /// 1 = semi-transparent, 2 = fully transparent, 3 = solid
    Transparency { id: i32, value: i32 },
    Clear { id: i32 },
    Remap { old_id: i32, new_id: i32 },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = jaws_core::init() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut app = jaws_core::App::new()?;

    match cli.command {
        Command::Weather(args) => weather(&app, args).await?,
        Command::Widget { action } => widget(&mut app, action)?,
    }

    app.shutdown()
}

async fn weather(app: &jaws_core::App, args: WeatherArgs) -> Result<(), AppError> {
    let config = app.config();
    let units = if args.imperial {
        UnitSystem::Imperial
    } else {
        config.weather.units
    };

    let selector = match (args.lat, args.lon, args.selector) {
        (Some(lat), Some(lon), _) => coordinates_selector(lat, lon),
        (_, _, Some(selector)) => selector,
        _ => return Err(ConfigError::Invalid("no location given".to_string()).into()),
    };

    let mut cache = WeatherCache::new(&config.config_dir);
    cache.load();

    let max_age = Duration::from_secs(u64::from(config.weather.refresh_minutes) * 60);
    let now = chrono::Utc::now().timestamp_millis();
    if !args.force {
        if let Some(cached) = cache
            .fresh_for(&selector, max_age, now)
            .filter(|r| r.units == units)
        {
            tracing::info!("Using cached weather for {}", selector);
            print_weather(cached);
            return Ok(());
        }
    }

    let provider = MeteoProvider::from_config(&config.weather)?;
    let result = match args.name {
        Some(name) => {
            provider
                .with_locality(FixedLocality(name))
                .fetch_by_selector(&selector, units)
                .await?
        }
        None => provider.fetch_by_selector(&selector, units).await?,
    };

    if let Err(e) = cache.store(&result) {
        tracing::warn!("Failed to cache weather: {}", e);
    }

    print_weather(&result);
    Ok(())
}

fn print_weather(w: &WeatherResult) {
    let temp_unit = w.temperature_unit();

    println!("{}", w.locality);
    println!(
        "  {} ({}) {:.1}{}, humidity {:.0}%, wind {:.1} {} from {}°",
        w.condition,
        w.condition_code,
        w.temperature,
        temp_unit,
        w.humidity,
        w.wind_speed,
        w.wind_speed_unit(),
        w.wind_direction
    );

    for day in &w.forecasts {
        if day.is_placeholder() {
            println!("  {:<10}  -", day.day);
        } else {
            println!(
                "  {:<10}  {:>5.1}{} / {:>5.1}{}  {} ({})",
                day.day, day.low, temp_unit, day.high, temp_unit, day.condition, day.condition_code
            );
        }
    }
}

fn widget(app: &mut jaws_core::App, action: WidgetAction) -> Result<(), AppError> {
    let prefs = app.prefs_mut();

    match action {
        WidgetAction::Show { id } => {
            let theme = prefs.color_theme(id);
            let bg = prefs.bg_transparency(id);
            println!("widget {}", id);
            println!("  color theme:      {} ({})", theme.label(), theme.value());
            println!("  bg transparency:  {} ({})", bg.label(), bg.value());
        }
        WidgetAction::Theme { id, value } => {
            let theme = ColorTheme::from_value(value)
                .ok_or_else(|| AppError::Prefs(format!("unknown color theme {}", value)))?;
            prefs.set_color_theme(id, theme);
            tracing::info!("Widget {} color theme set to {}", id, theme.label());
        }
        WidgetAction::Transparency { id, value } => {
            let bg = BgTransparency::from_value(value)
                .ok_or_else(|| AppError::Prefs(format!("unknown transparency {}", value)))?;
            prefs.set_bg_transparency(id, bg);
            tracing::info!("Widget {} background set to {}", id, bg.label());
        }
        WidgetAction::Clear { id } => {
            prefs.clear(id);
            tracing::info!("Cleared preferences of widget {}", id);
        }
        WidgetAction::Remap { old_id, new_id } => {
            prefs.remap(old_id, new_id);
            tracing::info!("Moved preferences of widget {} to {}", old_id, new_id);
        }
    }

    Ok(())
}
