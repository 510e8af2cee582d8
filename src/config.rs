use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

/// Daily requirements and occupant weights used by the preparedness
/// calculator. Weights scale the adult daily requirement.
#[derive(Debug, Clone, Deserialize)]
pub struct PreparednessConfig {
    pub kcal_per_adult_day: f64,
    pub water_litres_per_adult_day: f64,
    pub child_weight: f64,
    pub pet_weight: f64,
}

impl Default for PreparednessConfig {
    fn default() -> Self {
        Self {
            kcal_per_adult_day: 2000.0,
            water_litres_per_adult_day: 3.0,
            child_weight: 0.6,
            pet_weight: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub preparedness: PreparednessConfig,
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        // Tokens must survive restarts, so the signing key is required
        // configuration rather than generated per process.
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(120),
        };
        let defaults = PreparednessConfig::default();
        let preparedness = PreparednessConfig {
            kcal_per_adult_day: env_f64("PREP_KCAL_PER_ADULT_DAY", defaults.kcal_per_adult_day),
            water_litres_per_adult_day: env_f64(
                "PREP_WATER_LITRES_PER_ADULT_DAY",
                defaults.water_litres_per_adult_day,
            ),
            child_weight: env_f64("PREP_CHILD_WEIGHT", defaults.child_weight),
            pet_weight: env_f64("PREP_PET_WEIGHT", defaults.pet_weight),
        };
        Ok(Self {
            database_url,
            jwt,
            preparedness,
        })
    }
}
