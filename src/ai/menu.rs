use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{AiError, ChatMessage};
use crate::models::menu::MenuDay;

static PORTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(porții|portii|porție|portie|portions?|persoane)").expect("valid portions regex")
});

/// Weekdays a kindergarten menu covers, in order.
pub const MENU_DAYS: [&str; 5] = ["LUNI", "MARȚI", "MIERCURI", "JOI", "VINERI"];

/// Number of portions requested in free text ("pentru 20 portii"), 1 when absent.
pub fn parse_portions(text: &str) -> u32 {
    PORTIONS
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealKind {
    Breakfast,
    Snack,
    Lunch,
    AfternoonSnack,
}

impl MealKind {
    fn label(&self) -> &'static str {
        match self {
            MealKind::Breakfast => "Mic dejun",
            MealKind::Snack => "Gustare",
            MealKind::Lunch => "Prânz",
            MealKind::AfternoonSnack => "Gustare după-amiază",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMeal {
    pub kind: MealKind,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDay {
    pub day: String,
    pub meals: Vec<GeneratedMeal>,
}

/// The JSON document the completion endpoint must return for a menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMenu {
    pub title: String,
    pub portions: u32,
    pub days: Vec<GeneratedDay>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRequest {
    pub ingredients: String,
    #[serde(default)]
    pub menu_type: Option<String>,
}

const MENU_SCHEMA: &str = r#"{
  "title": "string",
  "portions": number,
  "days": [
    {
      "day": "LUNI | MARȚI | MIERCURI | JOI | VINERI",
      "meals": [
        {
          "kind": "breakfast | snack | lunch | afternoon_snack",
          "name": "string",
          "calories": number,
          "protein": number,
          "carbs": number,
          "fat": number,
          "ingredients": [{ "name": "string", "quantity": "string" }]
        }
      ]
    }
  ]
}"#;

pub fn menu_prompt(request: &MenuRequest) -> Vec<ChatMessage> {
    let portions = parse_portions(&request.ingredients);
    let menu_type = request.menu_type.as_deref().unwrap_or("meniu săptămânal pentru grădiniță");
    vec![
        ChatMessage::system(format!(
            "Ești nutriționist pentru o grădiniță din România. Răspunzi doar cu JSON valid, \
             exact după schema:\n{}\nValorile nutriționale sunt per porție; cantitățile de \
             ingrediente sunt pentru totalul de porții.",
            MENU_SCHEMA
        )),
        ChatMessage::user(format!(
            "Tip meniu: {}\nNumăr de porții: {}\nIngrediente disponibile: {}\n\
             Generează meniul de luni până vineri.",
            menu_type,
            portions,
            request.ingredients.trim()
        )),
    ]
}

/// Parses and checks the completion text against the menu schema.
pub fn parse_generated_menu(raw: &str) -> Result<GeneratedMenu, AiError> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let menu: GeneratedMenu = serde_json::from_str(trimmed).map_err(|e| AiError::InvalidResponse(e.to_string()))?;

    if menu.days.is_empty() {
        return Err(AiError::InvalidResponse("menu has no days".to_string()));
    }
    if let Some(day) = menu.days.iter().find(|d| d.meals.is_empty()) {
        return Err(AiError::InvalidResponse(format!("day {} has no meals", day.day)));
    }
    Ok(menu)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl GeneratedMenu {
    /// HTML body with a `<ZI> - [DATA]` heading per day, filled in on publish.
    pub fn to_html(&self) -> String {
        let mut html = format!("<h2>{}</h2>\n<p>Porții: {}</p>\n", escape_html(&self.title), self.portions);
        for day in &self.days {
            html.push_str(&format!("<h3>{} - [DATA]</h3>\n<table>\n", escape_html(&day.day.to_uppercase())));
            html.push_str("<tr><th>Masă</th><th>Preparat</th><th>kcal</th><th>Proteine</th><th>Carbohidrați</th><th>Grăsimi</th><th>Ingrediente</th></tr>\n");
            for meal in &day.meals {
                let ingredients = meal
                    .ingredients
                    .iter()
                    .map(|i| format!("{} ({})", escape_html(&i.name), escape_html(&i.quantity)))
                    .collect::<Vec<_>>()
                    .join(", ");
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{:.0}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{}</td></tr>\n",
                    meal.kind.label(),
                    escape_html(&meal.name),
                    meal.calories,
                    meal.protein,
                    meal.carbs,
                    meal.fat,
                    ingredients
                ));
            }
            html.push_str("</table>\n");
        }
        html
    }

    pub fn menu_days(&self) -> Vec<MenuDay> {
        self.days
            .iter()
            .map(|day| {
                let meal = |kind: MealKind| day.meals.iter().find(|m| m.kind == kind).map(|m| m.name.clone());
                MenuDay {
                    day: day.day.to_uppercase(),
                    breakfast: meal(MealKind::Breakfast),
                    snack: meal(MealKind::Snack),
                    lunch: meal(MealKind::Lunch),
                    afternoon_snack: meal(MealKind::AfternoonSnack),
                }
            })
            .collect()
    }
}
