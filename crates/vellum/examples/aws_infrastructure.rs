//! AWS infrastructure diagram for a healthcare management system.
//!
//! Builds a nested-cluster diagram (external users, VPC with public and
//! private subnets, Kubernetes workloads) and exports it as SVG, a
//! high-resolution PNG, PDF, and a text grid under `target/diagrams/`.

use vellum::{
    VellumError,
    builder::DiagramBuilder,
    color::Color,
    export::{ExportTarget, Exporter},
    model::{EdgeStyle, Orientation},
};

fn main() -> Result<(), VellumError> {
    env_logger::init();

    let mut builder = DiagramBuilder::new("AWS Infrastructure Architecture")
        .with_orientation(Orientation::TopToBottom)
        .with_background(color("white"));

    let mut web = None;
    let mut mobile = None;
    builder.tinted_cluster("users", "External Users", color("#f0f8ff"), |b| {
        web = Some(b.node("web", "client", "users", "Web Users\nDoctors & Patients")?);
        mobile = Some(b.node("mobile", "client", "mobile", "Mobile Users")?);
        Ok(())
    })?;

    let mut alb = None;
    let mut nat = None;
    let mut api = None;
    let mut db = None;
    builder.cluster("region", "AWS Region: us-east-1", |b| {
        b.tinted_cluster("vpc", "Healthcare VPC (10.0.0.0/16)", color("#e8f4fd"), |b| {
            let igw = b.node("igw", "network", "internet-gateway", "Internet Gateway")?;

            b.cluster("public", "Public Subnets", |b| {
                b.node("pub-1a", "network", "subnet-public", "Public 1a\n10.0.1.0/24")?;
                alb = Some(b.node("alb", "network", "load-balancer", "ALB\nPort 80")?);
                Ok(())
            })?;

            nat = Some(b.node("nat", "network", "nat-gateway", "NAT Gateway")?);

            b.cluster("private", "Private Subnets", |b| {
                b.node("priv-1a", "network", "subnet-private", "Private 1a\n10.0.3.0/24")?;
                api = Some(b.node("api", "compute", "instance", "Backend API\nNode.js")?);
                db = Some(b.node("db", "database", "relational", "PostgreSQL\nRDS")?);
                Ok(())
            })?;

            b.edge(igw, alb.unwrap())
        })?;
        Ok(())
    })?;

    builder.connect(
        &[web.unwrap(), mobile.unwrap()],
        &[alb.unwrap()],
        EdgeStyle::new().label("HTTPS"),
    )?;
    builder.connect(
        &[alb.unwrap()],
        &[api.unwrap()],
        EdgeStyle::new().label("HTTP :3000"),
    )?;
    builder.edge(api.unwrap(), db.unwrap())?;
    builder.connect(&[api.unwrap()], &[nat.unwrap()], EdgeStyle::new())?;

    let diagram = builder.finish()?;

    let exporter = Exporter::new("target/diagrams");
    let report = exporter.export(
        &diagram,
        &[
            ExportTarget::svg(),
            ExportTarget::png_at(192),
            ExportTarget::pdf(),
            ExportTarget::text(),
        ],
    )?;

    for path in report.written() {
        println!("wrote {}", path.display());
    }
    for failure in report.failures() {
        eprintln!("failed: {failure}");
    }

    println!("\n{}", vellum::render_text(&diagram, &Default::default()));
    Ok(())
}

fn color(css: &str) -> Color {
    Color::new(css).expect("example colors are valid CSS")
}
