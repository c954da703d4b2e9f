//! The paid package catalog shown on the package-selection screen.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// How a package is billed. Enterprise has no checkout at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Billing {
    OneTime,
    Monthly,
    Custom,
}

/// One purchasable tier. The catalog is compiled in, so the fields are
/// static borrows; only serialization out (for logs and payment
/// payloads) is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageTier {
    pub id: &'static str,
    pub name: &'static str,
    /// USD price; `None` for custom-priced tiers.
    pub price: Option<u32>,
    pub billing: Billing,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

impl PackageTier {
    /// Price in the smallest currency unit, as the payment intent wants it.
    pub fn amount_cents(&self) -> Option<u64> {
        self.price.map(|p| u64::from(p) * 100)
    }

    /// Enterprise is handled by sales, not by the card checkout.
    pub fn requires_sales_contact(&self) -> bool {
        self.billing == Billing::Custom
    }
}

/// The fixed tier list. Order matters: it is the display order.
pub static CATALOG: Lazy<Vec<PackageTier>> = Lazy::new(|| {
    vec![
        PackageTier {
            id: "starter",
            name: "Starter",
            price: Some(99),
            billing: Billing::OneTime,
            description: "Perfect for occasional listings",
            features: &[
                "1 custom listing presentation",
                "Delivered in minutes",
                "Branded shareable web page",
                "Email + SMS delivery",
            ],
            popular: false,
        },
        PackageTier {
            id: "pro",
            name: "Pro",
            price: Some(249),
            billing: Billing::Monthly,
            description: "Ideal for active agents",
            features: &[
                "Up to 5 custom presentations/month",
                "Delivered in minutes",
                "Reusable branding + agent profile",
                "Analytics dashboard (views, clicks)",
                "Priority support",
            ],
            popular: true,
        },
        PackageTier {
            id: "elite",
            name: "Elite",
            price: Some(649),
            billing: Billing::Monthly,
            description: "Built for high-performing agents",
            features: &[
                "Up to 15 custom presentations/month",
                "Delivered in minutes",
                "Custom templates",
                "Dedicated Listing Success Manager",
            ],
            popular: false,
        },
        PackageTier {
            id: "enterprise",
            name: "Enterprise",
            price: None,
            billing: Billing::Custom,
            description: "For brokerages and teams",
            features: &[
                "White-label + full integrations",
                "Custom templates + advanced analytics",
                "Live support + team training",
            ],
            popular: false,
        },
    ]
});

/// Looks a tier up by id.
pub fn find(id: &str) -> Option<&'static PackageTier> {
    CATALOG.iter().find(|t| t.id == id)
}
