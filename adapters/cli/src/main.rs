#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a scripted Cardfall session.
//!
//! Runs a deterministic swipe script against the engine on a virtual clock,
//! printing the resulting event stream. Catalog, weight, and liked-item
//! documents can be supplied as JSON files; a built-in demo catalog is used
//! otherwise.

mod storage;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;

use cardfall_core::{
    CaptionLine, CatalogConfig, CollectionConfig, CollectionName, Command, Event, FeverConfig,
    ImageKey, MemberColor, MemberConfig, MemberId, WeightSettings,
};
use cardfall_session::{apply, query, Session, SessionConfig};
use cardfall_system_gesture::{Config as GestureConfig, GestureTracker, PointerInput};
use tracing::info;
use tracing_subscriber::EnvFilter;

const VIEWPORT_WIDTH: f32 = 1_280.0;
const POINTER_Y: f32 = 360.0;

#[derive(Debug, Parser)]
#[command(name = "cardfall", about = "Scripted swipe sessions for the Cardfall engine")]
struct Args {
    /// Path to a catalog JSON file; the built-in demo catalog is used when absent.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to persisted weight settings JSON applied at startup.
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Path to the liked-entries JSON file, loaded at startup and saved on exit.
    #[arg(long)]
    liked: Option<PathBuf>,

    /// Number of scripted swipes to perform.
    #[arg(long, default_value_t = 12)]
    swipes: u32,

    /// Seed of the session's random stream.
    #[arg(long, default_value_t = 0x6c62_272e_07bb_0142)]
    seed: u64,

    /// Simulated milliseconds between swipes.
    #[arg(long, default_value_t = 400)]
    tick_ms: u64,
}

/// Entry point for the Cardfall command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut session = Session::new(SessionConfig {
        rng_seed: args.seed,
        fever: demo_fever_config(),
        ..SessionConfig::default()
    });
    let mut events = Vec::new();

    let catalog = match &args.catalog {
        Some(path) => {
            let catalog = storage::load_catalog(path)?;
            info!(members = catalog.members.len(), file = %path.display(), "catalog loaded");
            catalog
        }
        None => {
            let catalog = demo_catalog();
            info!(members = catalog.members.len(), "using the built-in demo catalog");
            catalog
        }
    };
    apply(
        &mut session,
        Command::ConfigureCatalog { config: catalog },
        &mut events,
    );
    apply(
        &mut session,
        Command::ConfigureCaptions {
            captions: demo_captions(),
        },
        &mut events,
    );

    if let Some(path) = &args.weights {
        let settings = storage::load_weights(path)?;
        info!(file = %path.display(), "applying persisted weight settings");
        apply(
            &mut session,
            Command::ApplyWeightSettings { settings },
            &mut events,
        );
    }
    if let Some(path) = &args.liked {
        if path.exists() {
            let entries = storage::load_liked(path)?;
            info!(entries = entries.len(), file = %path.display(), "liked entries seeded");
            apply(
                &mut session,
                Command::SeedLikedEntries { entries },
                &mut events,
            );
        }
    }
    print_events(&mut events);

    let mut tracker = GestureTracker::new(GestureConfig::default());
    let mut commands = Vec::new();
    let tick = Duration::from_millis(args.tick_ms);

    for index in 0..args.swipes {
        apply(&mut session, Command::Tick { dt: tick }, &mut events);

        // Every third swipe rejects; the rest like.
        let target_x = if index % 3 == 2 {
            VIEWPORT_WIDTH * 0.1
        } else {
            VIEWPORT_WIDTH * 0.9
        };
        let inputs = [
            PointerInput::Down {
                x: VIEWPORT_WIDTH / 2.0,
                y: POINTER_Y,
            },
            PointerInput::Move {
                x: target_x,
                y: POINTER_Y,
            },
            PointerInput::Up,
        ];
        tracker.handle(
            &events,
            &inputs,
            VIEWPORT_WIDTH,
            query::active_card(&session).is_some(),
            &mut commands,
        );
        print_events(&mut events);

        for command in commands.drain(..) {
            apply(&mut session, command, &mut events);
        }
        tracker.handle(
            &events,
            &[],
            VIEWPORT_WIDTH,
            query::active_card(&session).is_some(),
            &mut commands,
        );
        print_events(&mut events);
    }

    println!(
        "session done: {} liked, fever {:?}, gauge {:.1}%",
        query::liked_entries(&session).len(),
        query::fever_phase(&session),
        query::gauge_percent(&session),
    );

    if let Some(path) = &args.liked {
        storage::save_liked(path, query::liked_entries(&session))?;
    }
    if let Some(path) = &args.weights {
        let mut settings = WeightSettings::new();
        for member in query::member_view(&session) {
            settings.set(member.id, i64::from(member.weight));
        }
        storage::save_weights(path, &settings)?;
    }
    Ok(())
}

fn print_events(events: &mut Vec<Event>) {
    for event in events.drain(..) {
        println!("{}", describe(&event));
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::CatalogConfigured { members } => {
            format!("catalog configured with {members} members")
        }
        Event::WeightChanged { member, weight } => {
            format!("weight of {} set to {weight}", member.as_str())
        }
        Event::WeightRejected { member, reason } => {
            format!("weight change for {} rejected: {reason}", member.as_str())
        }
        Event::StackChanged { cards } => match cards.first() {
            Some(front) => format!(
                "stack rebuilt ({} cards, front: {} #{:02x}{:02x}{:02x} \"{}\")",
                cards.len(),
                front.display_name,
                front.color.red(),
                front.color.green(),
                front.color.blue(),
                front.caption,
            ),
            None => "stack is empty".to_owned(),
        },
        Event::CardCommitted { card, direction } => {
            format!(
                "{} swiped {:?} ({})",
                card.display_name,
                direction,
                card.image.as_str(),
            )
        }
        Event::GaugeUpdated { percent } => format!("gauge at {percent:.1}%"),
        Event::FeverStarted => "fever started".to_owned(),
        Event::FeverEnded => "fever ended".to_owned(),
        Event::OverlaySpawned { sticker } => {
            format!("overlay spawned: {}", sticker.as_str())
        }
        Event::OverlaysCleared => "overlays cleared".to_owned(),
    }
}

fn demo_catalog() -> CatalogConfig {
    let member = |id: &str, name: &str, color: MemberColor, count: u32| MemberConfig {
        id: MemberId::new(id),
        display_name: name.to_owned(),
        color,
        initial_weight: None,
        collections: vec![CollectionConfig {
            name: CollectionName::new("standard"),
            base_path: format!("images/{id}/standard/"),
            image_count: count,
        }],
    };

    CatalogConfig {
        members: vec![
            member("aki", "Aki", MemberColor::from_rgb(0xf9, 0x74, 0x30), 10),
            member("rin", "Rin", MemberColor::from_rgb(0x38, 0x8e, 0xd1), 8),
            member("sora", "Sora", MemberColor::from_rgb(0x7b, 0xc0, 0x4a), 6),
        ],
        default_weight: 1,
        selection_collection: CollectionName::new("standard"),
    }
}

fn demo_captions() -> Vec<CaptionLine> {
    let line = |id: &str, text: &str| CaptionLine {
        member: MemberId::new(id),
        text: text.to_owned(),
    };
    vec![
        line("aki", "Morning practice went great!"),
        line("aki", "Guess where this was taken."),
        line("rin", "New stage outfit, first look."),
        line("rin", "Rehearsal break snapshot."),
        line("sora", "Caught the sunset on the way home."),
    ]
}

fn demo_fever_config() -> FeverConfig {
    FeverConfig {
        duration: Duration::from_secs(20),
        stickers: vec![
            ImageKey::new("images/stickers/1.png"),
            ImageKey::new("images/stickers/2.png"),
            ImageKey::new("images/stickers/3.png"),
        ],
        ..FeverConfig::default()
    }
}
