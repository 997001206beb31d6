use tracing::info;

use valet::clock::StepClock;
use valet::engine::{Engine, EngineConfig};
use valet::ids::SequentialIds;
use valet::model::{Area, Vehicle, Zone};
use valet::observability;

/// Demo host: seeds a small lot, drives a deterministic day of traffic
/// through the façade, and prints the analytics snapshot. Everything
/// the core abstracts (clock, ids, config, seeding) lives here.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let zones: usize = std::env::var("VALET_ZONES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3)
        .max(1);
    let areas_per_zone: usize = std::env::var("VALET_AREAS_PER_ZONE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2);
    let slots_per_area: usize = std::env::var("VALET_SLOTS_PER_AREA")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);
    let vehicles: usize = std::env::var("VALET_VEHICLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(40);
    let penalty: u32 = std::env::var("VALET_CROSS_ZONE_PENALTY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    let metrics_port: Option<u16> = std::env::var("VALET_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());

    observability::init(metrics_port);

    let mut engine = Engine::with_parts(
        EngineConfig {
            cross_zone_penalty: penalty,
        },
        Box::new(StepClock::new(0, 1_000)),
        Box::new(SequentialIds::default()),
    );

    // Ring topology: zone-1 … zone-N, each adjacent to its successor
    // (and back, via connect_zones).
    for z in 1..=zones {
        let mut zone = Zone::new(format!("zone-{z}"), format!("Zone {z}"));
        for a in 1..=areas_per_zone {
            let mut area = Area::new(format!("z{z}-a{a}"), format!("Zone {z} level {a}"));
            area.add_slots(slots_per_area);
            zone.add_area(area);
        }
        engine.add_zone(zone)?;
    }
    for z in 1..=zones {
        let next = z % zones + 1;
        if next != z {
            engine.connect_zones(&format!("zone-{z}"), &format!("zone-{next}"))?;
        }
    }

    for v in 1..=vehicles {
        engine.add_vehicle(Vehicle::new(
            format!("veh-{v:03}"),
            format!("PLT-{v:04}"),
            format!("zone-{}", v % zones + 1),
        ))?;
    }

    info!(
        "seeded {zones} zones x {areas_per_zone} areas x {slots_per_area} slots, {vehicles} vehicles"
    );

    // One request per vehicle. Overflow past the lot capacity exercises
    // cross-zone fallback and the no-slots failure path.
    let mut active = Vec::new();
    for v in 1..=vehicles {
        let zone_id = format!("zone-{}", v % zones + 1);
        let created = engine.create_request(&format!("veh-{v:03}"), &zone_id)?;
        let request_id = created.request.id.clone();
        match engine.allocate(&request_id) {
            Ok(outcome) => {
                info!(request = %request_id, "{}", outcome.message);
                active.push(request_id);
            }
            Err(err) => info!(request = %request_id, "allocation failed: {err}"),
        }
    }

    // Undo the two newest allocations; their requests drop back to
    // requested, so they sit out the rest of the day.
    let report = engine.rollback(2);
    info!("rolled back {} allocation(s)", report.rolled_back);
    active.truncate(active.len().saturating_sub(report.rolled_back));

    // A mixed day: some cancel before entering, the rest park; a third
    // of the parked vehicles leave again.
    for (i, request_id) in active.iter().enumerate() {
        if i % 7 == 3 {
            let outcome = engine.cancel(request_id)?;
            info!("{}", outcome.message);
            continue;
        }
        engine.occupy(request_id)?;
        if i % 3 == 0 {
            let outcome = engine.release(request_id)?;
            info!("{}", outcome.message);
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.analytics())?);
    Ok(())
}
