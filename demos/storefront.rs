//! End-to-end storefront walk-through
//!
//! Builds the product-page experiment registry, pre-generates the static
//! routes, resolves a visitor against a stub backend, and round-trips the
//! resulting cookie values.
//!
//! Run with: cargo run --example storefront

use std::future::Future;

use anyhow::Result;
use varpath::codec::{AssignmentCodec, RuleCodec};
use varpath::cookies;
use varpath::identity::generate_visitor_id;
use varpath::provider::{resolve_assignments, ExperimentProvider, ProviderAssignment};
use varpath::schema::{ExperimentDef, Schema};
use varpath::variations::{resolve_route_assignment, VariationEnumerator};

/// Stub backend: buckets every visitor into the "Add to cart" variant of
/// the button experiment and leaves the rest to defaults.
struct StubBackend;

impl ExperimentProvider for StubBackend {
    fn fetch(
        &self,
        _visitor_id: &str,
        experiment: &str,
    ) -> impl Future<Output = varpath::Result<Option<ProviderAssignment>>> + Send {
        let response = (experiment == "button_text").then(|| {
            ProviderAssignment::new("targeting-rule-7").value("button_text", "Add to cart")
        });
        async move { Ok(response) }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let schema = Schema::builder()
        .experiment(
            "button_text",
            ExperimentDef::new().param("button_text", ["Buy now", "Add to cart"]),
        )
        .experiment(
            "image",
            ExperimentDef::new().param("image_url", ["tshirt", "tshirtgroup"]),
        )
        .experiment(
            "headline",
            ExperimentDef::new().param("headline", ["Plain tee", "Premium cotton tee"]),
        )
        .build();

    // Build-time: pre-generate one static route per reachable variation.
    let routes = VariationEnumerator::new(&schema)?.encode_all()?;
    println!("pre-generated {} routes:", routes.len());
    for route in &routes {
        println!("  /{route}");
    }

    // Request-time: a new visitor arrives without cookies.
    let visitor_id = generate_visitor_id();
    let resolved = resolve_assignments(&StubBackend, &schema, &visitor_id).await;

    let codec = AssignmentCodec::new(&schema)?;
    let encoded = codec.encode(&resolved.assignment)?;
    let rules = RuleCodec::new(&schema).encode(&resolved.rules);

    println!("\nvisitor {visitor_id}");
    println!(
        "  set {} = {encoded} (max-age {}d)",
        cookies::experiments_cookie_name(&schema)?,
        cookies::experiments_cookie_lifetime().num_days()
    );
    println!("  set {} = {rules}", cookies::rules_cookie_name(&schema)?);
    println!("  rewrite to /{encoded}");

    // Render-time: the route segment decodes back into page props.
    let props = resolve_route_assignment(&schema, Some(&encoded));
    println!("\npage props:");
    for (experiment, params) in &props {
        for (parameter, value) in params {
            println!("  {experiment}.{parameter} = {value}");
        }
    }

    // A stale or mangled segment falls back to defaults.
    let fallback = resolve_route_assignment(&schema, Some("9p9v9"));
    let default_rules = varpath::codec::default_rules(&schema);
    println!(
        "\nstale segment served {} default parameters ({} allocation rules)",
        fallback.values().map(|params| params.len()).sum::<usize>(),
        default_rules.len()
    );

    Ok(())
}
