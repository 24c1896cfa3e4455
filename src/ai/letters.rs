use super::ChatMessage;

const LETTER_SYSTEM: &str = "Ești educatoare la o grădiniță din România și scrii scrisori \
    calde și concise către părinți. Răspunzi doar cu textul scrisorii, fără titlu.";

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .filter(|a| !a.trim().is_empty())
        .map(|a| format!("- {}", a.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Monday letter: announces the week's theme and planned activities.
pub fn monday_prompt(week_id: &str, theme: &str, activities: &[String]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(LETTER_SYSTEM),
        ChatMessage::user(format!(
            "Scrie scrisoarea de luni pentru săptămâna {}.\nTema săptămânii: {}\nActivități planificate:\n{}",
            week_id,
            theme.trim(),
            bullet_list(activities)
        )),
    ]
}

/// Friday letter: recap built from the Monday letter's activity list.
pub fn friday_prompt(week_id: &str, theme: Option<&str>, activities: &[String], notes: Option<&str>) -> Vec<ChatMessage> {
    let mut prompt = format!(
        "Scrie scrisoarea de vineri pentru săptămâna {}, un rezumat al săptămânii.\n",
        week_id
    );
    if let Some(theme) = theme.filter(|t| !t.trim().is_empty()) {
        prompt.push_str(&format!("Tema săptămânii: {}\n", theme.trim()));
    }
    prompt.push_str(&format!("Activitățile desfășurate:\n{}", bullet_list(activities)));
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("\nObservații ale educatoarei: {}", notes.trim()));
    }
    vec![ChatMessage::system(LETTER_SYSTEM), ChatMessage::user(prompt)]
}
