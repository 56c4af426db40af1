//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `uniteer_core` linkage.
//! - Run one funnel drag end to end against the configured database.

use std::error::Error;
use uniteer_core::{
    init_logging_from_config, open_db, open_db_in_memory, BoardService, BoardTemplate,
    CoreConfig, Deal, DragResult, DropLocation, NoHook, SqliteBoardRepository,
};

const DEMO_BOARD_KEY: &str = "funnel:demo";

fn main() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging_from_config(&config)?;

    println!("uniteer_core ping={}", uniteer_core::ping());
    println!("uniteer_core version={}", uniteer_core::core_version());

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let service = BoardService::<_, Deal>::new(SqliteBoardRepository::try_new(&conn)?);

    let board = service.open_or_create(DEMO_BOARD_KEY, BoardTemplate::SalesFunnel)?;
    let (lead, qualified) = match board.stage_order() {
        [lead, qualified, ..] => (lead.clone(), qualified.clone()),
        _ => return Err("demo funnel needs at least two stages".into()),
    };

    let mut deal = Deal::new("Acme Corp");
    deal.value = Deal::parse_value("1500");
    deal.assigned_team = Deal::parse_team("Alice, Bob");
    let deal_id = service.create_item(DEMO_BOARD_KEY, &lead, deal)?;

    let position = service
        .load(DEMO_BOARD_KEY)?
        .locate_item(deal_id)
        .map(|(_, index)| index)
        .unwrap_or_default();
    let drag = DragResult::item(
        deal_id,
        DropLocation::new(lead.as_str(), position),
        Some(DropLocation::new(qualified.as_str(), 0)),
    );
    let outcome = service.apply_drag(DEMO_BOARD_KEY, &drag, &NoHook)?;
    println!("uniteer_core demo_move={outcome:?}");

    let board = service.load(DEMO_BOARD_KEY)?;
    for stage in board.stages() {
        println!("  {} ({}): {} deal(s)", stage.title(), stage.id(), stage.len());
    }
    Ok(())
}
