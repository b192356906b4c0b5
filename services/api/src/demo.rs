use crate::infra::{parse_level, parse_miles, parse_pickup_time, InMemoryTripRepository};
use crate::routes::{rank_options, RankResponse};
use chrono::NaiveDateTime;
use clap::Args;
use nemt_dispatch::config::ConfigError;
use nemt_dispatch::error::AppError;
use nemt_dispatch::workflows::dispatch::{DispatchService, PickupWindow, TripRequest};
use nemt_dispatch::workflows::fulfillment::{
    Address, Capabilities, FleetAssignment, FulfillmentOption, GeoPoint, MarketplaceBid,
    MobilityType, OptionBoard, OptionId, RankingConfig, SearchSession, SpecialNeed, TncQuote,
    TripConstraints,
};
use nemt_dispatch::workflows::pricing::{mock_pricing_result, PricingResult};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON file with `constraints` and `options`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Best Match weight on normalized cost
    #[arg(long)]
    pub(crate) cost_weight: Option<f64>,
    /// Best Match weight on normalized ETA
    #[arg(long)]
    pub(crate) eta_weight: Option<f64>,
    /// Print the ranked board as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PriceArgs {
    /// Trip distance in miles
    #[arg(long, value_parser = parse_miles)]
    pub(crate) miles: f64,
    /// Level of service (ambulatory, wheelchair, stretcher, bariatric, bls)
    #[arg(long, value_parser = parse_level)]
    pub(crate) level: MobilityType,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Level of service for the sample trip. Defaults to wheelchair.
    #[arg(long, value_parser = parse_level)]
    pub(crate) level: Option<MobilityType>,
    /// Scheduled pickup (YYYY-MM-DDTHH:MM). Omit for a will-call trip.
    #[arg(long, value_parser = parse_pickup_time)]
    pub(crate) pickup_at: Option<NaiveDateTime>,
    /// Stop after the search instead of assigning the first top pick.
    #[arg(long)]
    pub(crate) skip_assignment: bool,
}

#[derive(Debug, Deserialize)]
struct RankInput {
    constraints: TripConstraints,
    options: Vec<FulfillmentOption>,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        input,
        cost_weight,
        eta_weight,
        json,
    } = args;

    let raw = fs::read_to_string(&input)?;
    let RankInput {
        constraints,
        options,
    } = serde_json::from_str(&raw)?;

    let defaults = RankingConfig::default();
    let weights = RankingConfig {
        cost_weight: cost_weight.unwrap_or(defaults.cost_weight),
        eta_weight: eta_weight.unwrap_or(defaults.eta_weight),
    };
    if !weights.is_valid() {
        return Err(ConfigError::InvalidRankingWeights.into());
    }

    let response = rank_options(&constraints, &options, weights);
    if json {
        println!("{}", serde_json::to_string_pretty(&response.board)?);
        return Ok(());
    }

    println!(
        "Ranked {} options for a {} trip (cost weight {:.2}, ETA weight {:.2})",
        options.len(),
        constraints.mobility_type.label(),
        weights.cost_weight,
        weights.eta_weight
    );
    render_board(&response.board);
    render_assessments(&response);
    Ok(())
}

pub(crate) fn run_price(args: PriceArgs) -> Result<(), AppError> {
    let result = mock_pricing_result(args.miles, args.level);
    render_pricing(&result);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        level,
        pickup_at,
        skip_assignment,
    } = args;

    let level = level.unwrap_or(MobilityType::Wheelchair);
    let pickup_window = match pickup_at {
        Some(pickup_at) => PickupWindow::Scheduled { pickup_at },
        None => PickupWindow::WillCall,
    };

    println!("NEMT dispatch demo");
    let repository = Arc::new(InMemoryTripRepository::default());
    let service = DispatchService::new(repository, RankingConfig::default());

    let (pickup, dropoff) = demo_addresses();
    let constraints = TripConstraints {
        escort_count: 1,
        ..TripConstraints::new(level).with_need(SpecialNeed::Oxygen)
    };
    let request = TripRequest {
        pickup,
        dropoff,
        constraints,
        pickup_window,
    };

    let record = service.post_trip(request)?;
    println!(
        "- Posted {}: {} -> {}",
        record.trip_id,
        record.request.pickup.one_line(),
        record.request.dropoff.one_line()
    );
    match &record.request.pickup_window {
        PickupWindow::Scheduled { pickup_at } => {
            println!("  Pickup scheduled for {}", pickup_at.format("%Y-%m-%d %H:%M"))
        }
        PickupWindow::WillCall => println!("  Will-call pickup"),
    }
    println!(
        "  {} | {:.1} mi | oxygen | {} escort",
        level.label(),
        record.mileage,
        record.request.constraints.escort_count
    );
    render_pricing(&record.pricing);

    let mut session = SearchSession::new(demo_options(level));
    while !session.is_complete() {
        let finished = session.advance();
        println!(
            "\n{} ({} of {} options visible)",
            finished.label(),
            session.visible_options().len(),
            session.total_options()
        );
        let board =
            service.record_options(&record.trip_id, session.visible_options().to_vec())?;
        render_board(&board);
    }

    if skip_assignment {
        return Ok(());
    }

    let board = service.board(&record.trip_id)?;
    let Some(choice) = board.top_picks.first() else {
        println!("\nNo compatible option to assign.");
        return Ok(());
    };

    let assignment = service.assign(&record.trip_id, choice.option.id())?;
    println!(
        "\nAssigned {} to {} ({}) at ${:.2}",
        record.trip_id,
        assignment.provider_label,
        assignment.kind.label(),
        assignment.cost
    );
    if let Some(margin) = assignment_margin(&record.pricing, assignment.cost) {
        println!("  Margin against suggested buyer rate: ${margin:.2}");
    }

    Ok(())
}

fn assignment_margin(pricing: &PricingResult, cost: f64) -> Option<f64> {
    let margin = pricing.suggested_buyer_rate - cost;
    margin.is_finite().then_some(margin)
}

fn render_pricing(result: &PricingResult) {
    println!(
        "Pricing suggestion ({}, {:.1} mi)",
        result.level_of_service.label(),
        result.miles
    );
    println!(
        "- Buyer ${:.2} | Seller ${:.2} | Median ${:.2} (p25 ${:.2}, p75 ${:.2})",
        result.suggested_buyer_rate,
        result.suggested_seller_rate,
        result.median_rate,
        result.percentile_25,
        result.percentile_75
    );
    println!(
        "- Confidence {:.0}% | Acceptance {:.0}% | {} comparable trips",
        result.confidence_score * 100.0,
        result.acceptance_probability * 100.0,
        result.sample_size
    );
    println!("  {}", result.explanation);
    for factor in &result.factors {
        println!(
            "  - {} ({:.0}%): {}",
            factor.name,
            factor.weight * 100.0,
            factor.detail
        );
    }
}

fn render_board(board: &OptionBoard) {
    if board.is_empty() {
        println!("  No options yet");
        return;
    }

    if board.top_picks.is_empty() {
        println!("  No compatible top picks");
    }
    for pick in &board.top_picks {
        println!("  [{}] {}", pick.badge.label(), describe(&pick.option));
    }
    for option in &board.remaining.compatible {
        println!("  [Option] {}", describe(option));
    }
    for option in &board.remaining.incompatible {
        println!("  [Incompatible] {}", describe(option));
    }
}

fn render_assessments(response: &RankResponse) {
    let gaps: Vec<_> = response
        .assessments
        .iter()
        .filter(|assessment| !assessment.is_compatible())
        .collect();
    if gaps.is_empty() {
        return;
    }

    println!("Compatibility gaps:");
    for assessment in gaps {
        println!("  - {}: {}", assessment.option_id, assessment.summary());
    }
}

fn describe(option: &FulfillmentOption) -> String {
    format!(
        "{} ({}) ${:.2} | {} min",
        option.label(),
        option.kind().label(),
        option.cost(),
        option.eta_minutes()
    )
}

fn demo_addresses() -> (Address, Address) {
    let pickup = Address {
        label: "Residence".to_string(),
        street: "2140 N Lincoln Ave".to_string(),
        city: "Chicago".to_string(),
        state: "IL".to_string(),
        zip: "60614".to_string(),
        location: GeoPoint {
            latitude: 41.9214,
            longitude: -87.6513,
        },
    };
    let dropoff = Address {
        label: "Dialysis Center".to_string(),
        street: "1725 W Harrison St".to_string(),
        city: "Chicago".to_string(),
        state: "IL".to_string(),
        zip: "60612".to_string(),
        location: GeoPoint {
            latitude: 41.8742,
            longitude: -87.6700,
        },
    };
    (pickup, dropoff)
}

fn demo_options(level: MobilityType) -> Vec<FulfillmentOption> {
    let equipped = Capabilities::new([level], [SpecialNeed::Oxygen]);
    vec![
        FulfillmentOption::Fleet(FleetAssignment {
            id: OptionId::new("fleet-van-12"),
            vehicle_name: "Van 12".to_string(),
            driver_name: Some("R. Alvarez".to_string()),
            internal_cost: 55.0,
            eta_minutes: 20,
            capabilities: equipped.clone(),
        }),
        FulfillmentOption::Fleet(FleetAssignment {
            id: OptionId::new("fleet-sedan-3"),
            vehicle_name: "Sedan 3".to_string(),
            driver_name: None,
            internal_cost: 31.0,
            eta_minutes: 40,
            capabilities: Capabilities::default(),
        }),
        FulfillmentOption::Tnc(TncQuote {
            id: OptionId::new("tnc-uber-wav"),
            display_name: "Uber".to_string(),
            product: "WAV".to_string(),
            cost: 46.5,
            eta_minutes: 9,
            capabilities: Capabilities::new([MobilityType::Wheelchair], []),
        }),
        FulfillmentOption::Tnc(TncQuote {
            id: OptionId::new("tnc-lyft"),
            display_name: "Lyft".to_string(),
            product: "Standard".to_string(),
            cost: 19.75,
            eta_minutes: 5,
            capabilities: Capabilities::default(),
        }),
        FulfillmentOption::Marketplace(MarketplaceBid {
            id: OptionId::new("bid-metro-care"),
            provider_name: "Metro Care Transport".to_string(),
            cost: 52.0,
            eta_minutes: 30,
            rating: 4.7,
            capabilities: equipped.clone(),
        }),
        FulfillmentOption::Marketplace(MarketplaceBid {
            id: OptionId::new("bid-lakeshore"),
            provider_name: "Lakeshore Medical Rides".to_string(),
            cost: 64.0,
            eta_minutes: 14,
            rating: 4.9,
            capabilities: equipped,
        }),
    ]
}
