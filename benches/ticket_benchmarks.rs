//! Performance benchmarks for the contract matching and ticket
//! lifecycle hot paths.
//!
//! Demand lookup and software matching run on every ticket creation
//! and edit, so both are measured against catalogs far larger than a
//! production contract would carry.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ticketing::core::{
    Contract, ContractBuilder, ContractSoftware, Demand, OrganizationId, SoftwareId,
    TicketBuilder, TicketSoftware, TicketState, UserId,
};
use ticketing::storage::TicketPatch;
use ticketing::validation::tracked_field_changes;

const DESCRIPTION: &str =
    "The shared calendar stopped syncing for every member of the accounting team this morning.";

/// Contract carrying `demands` demand entries and `entries` catalog
/// entries over the same template.
fn build_contract(template: SoftwareId, demands: usize, entries: usize) -> Contract {
    let mut builder = ContractBuilder::new()
        .title("Benchmark support")
        .organization(OrganizationId::new())
        .default_support_manager(UserId::new());

    for index in 0..demands {
        builder = builder.demand(Demand {
            demand_type: format!("Info{index}"),
            issue_type: Some(format!("Blocking{index}")),
            software_type: Some(format!("Normal{index}")),
            response_time: Some(1),
            workaround_time: Some(2),
            correction_time: Some(3),
        });
    }
    for index in 0..entries {
        builder = builder.software_entry(ContractSoftware {
            template,
            versions: (0..8).map(|v| format!("{index}.{v}")).collect(),
            software_type: format!("Normal{index}"),
        });
    }
    builder.build()
}

fn bench_demand_lookup(c: &mut Criterion) {
    let contract = build_contract(SoftwareId::new(), 50, 0);

    c.bench_function("demand_lookup_last_of_50", |b| {
        b.iter(|| {
            contract.demand_for(
                black_box("Info49"),
                black_box(Some("Blocking49")),
                black_box(Some("Normal49")),
            )
        })
    });

    c.bench_function("demand_lookup_miss_50", |b| {
        b.iter(|| {
            contract.demand_for(
                black_box("Info49"),
                black_box(Some("Blocking0")),
                black_box(Some("Normal49")),
            )
        })
    });
}

fn bench_software_match(c: &mut Criterion) {
    let template = SoftwareId::new();
    let contract = build_contract(template, 0, 50);

    c.bench_function("software_match_last_of_50", |b| {
        b.iter(|| {
            contract.matches_software(black_box(template), black_box("49.7"), black_box("Normal49"))
        })
    });
}

fn bench_state_transition(c: &mut Criterion) {
    let ticket = TicketBuilder::new()
        .title("Benchmark ticket")
        .demand_type("Info1")
        .description(DESCRIPTION)
        .requester(UserId::new())
        .support_manager(UserId::new())
        .build();

    c.bench_function("apply_state_new_to_in_progress", |b| {
        b.iter(|| {
            let mut candidate = ticket.clone();
            candidate.apply_state(black_box(TicketState::InProgress), Utc::now())
        })
    });
}

fn bench_changeset_build(c: &mut Criterion) {
    let ticket = TicketBuilder::new()
        .title("Benchmark ticket")
        .demand_type("Info1")
        .severity("Blocking1")
        .software(TicketSoftware {
            template: SoftwareId::new(),
            version: "1".to_string(),
            criticality: "Normal1".to_string(),
        })
        .description(DESCRIPTION)
        .requester(UserId::new())
        .support_manager(UserId::new())
        .build();

    let patch = TicketPatch {
        title: Some("Renamed ticket".to_string()),
        demand_type: Some("Info2".to_string()),
        severity: Some(Some("Blocking2".to_string())),
        description: Some(format!("{DESCRIPTION} It now affects the sales team too.")),
        environment: Some(Some("Debian 12".to_string())),
        ..TicketPatch::default()
    };

    c.bench_function("changeset_five_tracked_fields", |b| {
        b.iter(|| tracked_field_changes(black_box(&ticket), black_box(&patch)))
    });
}

criterion_group!(
    benches,
    bench_demand_lookup,
    bench_software_match,
    bench_state_transition,
    bench_changeset_build,
);
criterion_main!(benches);
