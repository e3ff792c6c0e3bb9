use bevy::prelude::*;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use shooty::arena::{ArenaDefinition, BarrierDefinition};
use shooty::game_logic::errors::{ShootyError, ShootyResult};
use shooty::geometry::Aabb;
use shooty::pathfinding::find_path;
use std::path::Path;

#[derive(Parser, Clone, Debug)]
#[command(name = "arenagen")]
#[command(about = "Generate arena files for Shooty Face")]
struct Args {
    /// Arena name
    #[arg(long, default_value = "generated_arena")]
    name: String,

    /// Arena size in tiles (format: COLUMNSxROWS)
    #[arg(long, default_value = "40x22")]
    size: String,

    /// World units per tile side
    #[arg(long, default_value = "32.0")]
    tile_size: f32,

    /// Output file path relative to the arenas/ directory
    #[arg(long)]
    output: Option<String>,

    /// Random seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,

    /// Number of barriers to scatter inside the walls
    #[arg(long, default_value = "12")]
    barriers: u32,

    /// Largest barrier side, in tiles
    #[arg(long, default_value = "4")]
    max_barrier_tiles: u32,

    /// Number of enemy spawn points
    #[arg(long, default_value = "4")]
    enemies: u32,

    /// Side length of the largest body that must fit through the arena
    #[arg(long, default_value = "40.0")]
    body_size: f32,
}

/// Parse size string "COLUMNSxROWS"
fn parse_size(size_str: &str) -> ShootyResult<(u32, u32)> {
    let invalid = || ShootyError::InvalidArgument {
        reason: format!("Invalid size '{size_str}'. Expected COLUMNSxROWS"),
    };

    let (columns, rows) = size_str.split_once('x').ok_or_else(invalid)?;
    let columns: u32 = columns.trim().parse().map_err(|_| invalid())?;
    let rows: u32 = rows.trim().parse().map_err(|_| invalid())?;

    if columns < 8 || rows < 8 {
        return Err(ShootyError::InvalidArgument {
            reason: "An arena needs at least 8x8 tiles".to_string(),
        });
    }

    Ok((columns, rows))
}

fn validate_output_path(filename: &str) -> ShootyResult<()> {
    if Path::new(filename).is_absolute() {
        return Err(ShootyError::InvalidArgument {
            reason: format!("Output path must be relative to arenas/, got {filename}"),
        });
    }
    if filename.contains("..") {
        return Err(ShootyError::InvalidArgument {
            reason: "Output path cannot contain '..'".to_string(),
        });
    }
    Ok(())
}

struct Layout {
    name: String,
    columns: u32,
    rows: u32,
    tile_size: f32,
    barriers: u32,
    max_barrier_tiles: u32,
    enemies: u32,
    body_size: f32,
}

impl Layout {
    fn from_args(args: &Args) -> ShootyResult<Self> {
        let (columns, rows) = parse_size(&args.size)?;
        Ok(Self {
            name: args.name.clone(),
            columns,
            rows,
            tile_size: args.tile_size,
            barriers: args.barriers,
            max_barrier_tiles: args.max_barrier_tiles.max(1),
            enemies: args.enemies,
            body_size: args.body_size,
        })
    }
}

fn blocked(barriers: &[BarrierDefinition], area: &Aabb) -> bool {
    barriers.iter().any(|barrier| barrier.aabb().overlaps(area))
}

/// Scatter barriers and enemy spawns inside a walled room.
///
/// Barriers keep clear of the player spawn, and an enemy spawn is only kept
/// when a body of `body_size` could walk from it to the player.
fn generate_arena(layout: &Layout, rng: &mut Pcg64) -> ShootyResult<ArenaDefinition> {
    let tile = layout.tile_size;
    let half = Vec2::new(layout.columns as f32, layout.rows as f32) * tile / 2.0;
    let player_spawn = Vec2::ZERO;
    let clearance = Aabb::fixed(player_spawn, Vec2::splat(layout.body_size * 3.0));

    let mut barriers = BarrierDefinition::outer_walls(half, tile);
    let mut attempts = 0;
    let mut placed = 0;
    while placed < layout.barriers && attempts < layout.barriers * 20 {
        attempts += 1;
        let size = Vec2::new(
            rng.gen_range(1..=layout.max_barrier_tiles) as f32,
            rng.gen_range(1..=layout.max_barrier_tiles) as f32,
        ) * tile;
        let min_corner = Vec2::new(
            rng.gen_range(1..layout.columns - 1) as f32,
            rng.gen_range(1..layout.rows - 1) as f32,
        ) * tile
            - half;
        let barrier = BarrierDefinition::new(min_corner + size / 2.0, size);

        if barrier.aabb().overlaps(&clearance) {
            continue;
        }
        barriers.push(barrier);
        placed += 1;
    }

    let mut arena = ArenaDefinition::new(
        layout.name.clone(),
        layout.columns,
        layout.rows,
        tile,
        player_spawn,
        Vec::new(),
        barriers,
    )?;

    let grid = arena.tile_grid();
    let map = grid.build_map(
        arena
            .barriers
            .iter()
            .map(|barrier| (Entity::PLACEHOLDER, barrier.aabb())),
        &[],
    );
    let body = Vec2::splat(layout.body_size);
    let footprint = grid.tile_span(body);
    let player_tile = grid.tile_for(player_spawn - body / 2.0);

    attempts = 0;
    while (arena.enemy_spawns.len() as u32) < layout.enemies && attempts < layout.enemies * 50 {
        attempts += 1;
        let tile_index = IVec2::new(
            rng.gen_range(1..layout.columns as i32 - 1),
            rng.gen_range(1..layout.rows as i32 - 1),
        );
        let spawn = grid.position_for(tile_index) + body / 2.0;

        if blocked(&arena.barriers, &Aabb::fixed(spawn, body)) {
            continue;
        }
        if !find_path(tile_index, player_tile, footprint, &map).has_path {
            continue;
        }
        arena.enemy_spawns.push(spawn);
    }

    if (arena.enemy_spawns.len() as u32) < layout.enemies {
        println!(
            "Only found room for {} of {} enemy spawns",
            arena.enemy_spawns.len(),
            layout.enemies
        );
    }

    arena.check()?;
    Ok(arena)
}

fn main() -> ShootyResult<()> {
    let args = Args::parse();

    let layout = Layout::from_args(&args)?;
    let output_filename = args.output.clone().unwrap_or_else(|| format!("{}.bin", args.name));
    validate_output_path(&output_filename)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating arena '{}' (seed: {seed})", layout.name);

    let mut rng = Pcg64::seed_from_u64(seed);
    let arena = generate_arena(&layout, &mut rng)?;
    let path = arena.save_to_file(&output_filename)?;

    println!("Arena saved successfully to: {}", path.display());
    println!("\nArena summary:");
    println!("  Name: {}", arena.name);
    println!(
        "  Tiles: {}x{} at {} units per tile",
        arena.columns, arena.rows, arena.tile_size
    );
    println!("  Player spawn: {}", arena.player_spawn);
    println!("  Enemy spawns: {}", arena.enemy_spawns.len());
    println!(
        "  Barriers: {} (including 4 outer walls)",
        arena.barriers.len()
    );

    Ok(())
}
