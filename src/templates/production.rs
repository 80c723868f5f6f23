//! Production apex zone: sandbox delegation, website, and mail records.

use crate::core::error::Result;
use crate::core::types::{Expr, Parameter, Template};
use crate::resources::route53::{HostedZone, RecordSet, RecordType, ZoneRef};

pub const HOSTED_ZONE_NAME: &str = "HostedZoneName";
pub const HOSTED_ZONE: &str = "HostedZone";

const SHORT_TTL: u32 = 900;
const LONG_TTL: u32 = 86400;

const SANDBOX_NAME_SERVERS: &[&str] = &[
    "ns-1163.awsdns-17.org.",
    "ns-442.awsdns-55.com.",
    "ns-847.awsdns-41.net.",
    "ns-1867.awsdns-41.co.uk.",
];

const SITE_ADDRESSES: &[&str] = &[
    "198.185.159.144",
    "198.185.159.145",
    "198.49.23.145",
    "198.49.23.144",
];

const MAIL_EXCHANGERS: &[&str] = &[
    "1 ASPMX.L.GOOGLE.COM.",
    "5 ALT1.ASPMX.L.GOOGLE.COM.",
    "5 ALT2.ASPMX.L.GOOGLE.COM.",
    "10 ALT3.ASPMX.L.GOOGLE.COM.",
    "10 ALT4.ASPMX.L.GOOGLE.COM.",
];

const SITE_VERIFICATION: &[&str] =
    &["\"google-site-verification=TzJvGzIQZJWwPSkSMxlVh0mMKiCsdwkVXX8Q_g_XzuI\""];

const SQUARESPACE_VERIFY: &[&str] = &["verify.squarespace.com."];
const SQUARESPACE_SITE: &[&str] = &["ext-cust.squarespace.com."];

/// Zone name with the trailing dot: `{HostedZoneName}.`
fn zone_name() -> Expr {
    Expr::concat(vec![Expr::reference(HOSTED_ZONE_NAME), ".".into()])
}

fn subdomain(label: &str) -> Expr {
    Expr::concat(vec![format!("{label}.").into(), zone_name()])
}

pub fn build() -> Result<Template> {
    let mut t = Template::new("Production DNS zone");

    t.add_parameter(
        HOSTED_ZONE_NAME,
        Parameter::string("The DNS name of an existing Amazon Route 53 hosted zone")
            .with_default("pilosa.com"),
    )?;

    t.add_resource(HOSTED_ZONE, HostedZone::public(zone_name()))?;

    let records = [
        ("SandboxRecordSet", subdomain("sandbox"), RecordType::Ns, SHORT_TTL, SANDBOX_NAME_SERVERS),
        ("PilosaDotComRecordSet", zone_name(), RecordType::A, SHORT_TTL, SITE_ADDRESSES),
        ("MXRecordSet", zone_name(), RecordType::Mx, LONG_TTL, MAIL_EXCHANGERS),
        ("TXTRecordSet", zone_name(), RecordType::Txt, LONG_TTL, SITE_VERIFICATION),
        (
            "SquarespaceVerifyRecordSet",
            subdomain("l9gnfpg7g8edla25773h"),
            RecordType::Cname,
            SHORT_TTL,
            SQUARESPACE_VERIFY,
        ),
        ("WWWRecordSet", subdomain("www"), RecordType::Cname, SHORT_TTL, SQUARESPACE_SITE),
    ];

    for (id, name, record_type, ttl, values) in records {
        let zone = ZoneRef::Id(Expr::reference(HOSTED_ZONE));
        t.add_resource(id, RecordSet::literal(zone, name, record_type, ttl, values))?;
    }

    Ok(t)
}
