use std::fmt;

use super::dto::NutritionResult;

#[derive(Debug, Clone, PartialEq)]
pub struct MacroBar {
    pub label: &'static str,
    pub grams: f64,
    /// Share of protein + fat + carbs, 0 when all three are 0.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(c: f64) -> Self {
        if c >= 0.8 {
            Self::High
        } else if c >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Display-ready view of a [`NutritionResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionCard {
    pub title: String,
    pub calories_label: String,
    pub weight_label: String,
    pub macros: [MacroBar; 3],
    /// Protein + fat + carbs in grams.
    pub total_macros: f64,
    pub density_label: String,
    /// Percent and tier; absent when the model gave no confidence.
    pub confidence: Option<(u8, ConfidenceTier)>,
    pub recommendations: Vec<String>,
}

/// kcal per 100 g; 0 for a zero weight instead of NaN or infinity.
pub fn calorie_density(calories: u32, weight: u32) -> f64 {
    if weight == 0 {
        return 0.0;
    }
    f64::from(calories) / f64::from(weight) * 100.0
}

impl NutritionCard {
    pub fn new(r: &NutritionResult) -> Self {
        let total = r.protein + r.fat + r.carbs;
        let bar = |label, grams: f64| MacroBar {
            label,
            grams,
            percentage: if total > 0.0 { grams / total * 100.0 } else { 0.0 },
        };

        let density_label = if r.weight > 0 {
            format!("{:.1} kcal/100g", calorie_density(r.calories, r.weight))
        } else {
            "0 kcal/100g".to_string()
        };

        let confidence = (r.confidence > 0.0).then(|| {
            (
                (r.confidence * 100.0).round() as u8,
                ConfidenceTier::from_confidence(r.confidence),
            )
        });

        Self {
            title: r.name.clone(),
            calories_label: format!("{} kcal", r.calories),
            weight_label: format!("{}g total", r.weight),
            macros: [
                bar("Proteínas", r.protein),
                bar("Grasas", r.fat),
                bar("Carbohidratos", r.carbs),
            ],
            total_macros: total,
            density_label,
            confidence,
            recommendations: r.recommendations.clone(),
        }
    }
}

fn grams(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}g", v)
    } else {
        format!("{:.1}g", v)
    }
}

impl fmt::Display for NutritionCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}  ·  {}", self.calories_label, self.weight_label)?;
        writeln!(f)?;
        writeln!(f, "Información Nutricional")?;
        for m in &self.macros {
            let filled = (m.percentage / 5.0).round() as usize;
            writeln!(
                f,
                "  {:<14}{:>8}  {:>5.1}%  {}",
                m.label,
                grams(m.grams),
                m.percentage,
                "█".repeat(filled.min(20))
            )?;
        }
        writeln!(f, "Total de macronutrientes: {:.1}g", self.total_macros)?;
        writeln!(f)?;
        writeln!(f, "{}", self.density_label)?;
        if let Some((pct, tier)) = self.confidence {
            let word = match tier {
                ConfidenceTier::High => "alta",
                ConfidenceTier::Medium => "media",
                ConfidenceTier::Low => "baja",
            };
            writeln!(f, "Confianza: {}% ({})", pct, word)?;
        }
        for rec in &self.recommendations {
            writeln!(f, "  • {}", rec)?;
        }
        Ok(())
    }
}

impl From<&NutritionResult> for NutritionCard {
    fn from(r: &NutritionResult) -> Self {
        Self::new(r)
    }
}
