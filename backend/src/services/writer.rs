//! Text rendering: Hungarian articles, per-city chat replies and AI prompts

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::{round_one_decimal, AggregateRecord, ConsensusForecast, Language, Place, TargetDay, WeatherAlert};

use crate::external::ai_writer::ChatMessage;
use crate::services::i18n::weekday_name;

/// Gusts at or above this speed are called out
const WIND_WARNING_KMH: i64 = 35;

const SOURCES_FOOTER: &str = "Források: Open-Meteo, OpenWeather (One Call 3.0)";

// ============================================================================
// Formatting helpers
// ============================================================================

pub fn format_temp(value: Decimal) -> String {
    format!("{:.1} °C", round_one_decimal(value))
}

pub fn format_precip(value: Decimal) -> String {
    if value < Decimal::new(5, 2) {
        "0 mm".to_string()
    } else {
        format!("{:.1} mm", round_one_decimal(value))
    }
}

pub fn rain_emoji(precip_mm: Decimal) -> &'static str {
    if precip_mm >= Decimal::from(10) {
        "🌧️"
    } else if precip_mm >= Decimal::ONE {
        "🌦️"
    } else {
        "☀️"
    }
}

fn round_kmh(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Wind summary line, `None` when no wind data is available
pub fn wind_line(max_wind_kmh: Option<Decimal>) -> Option<String> {
    let speed = round_kmh(max_wind_kmh?);
    if speed < Decimal::from(WIND_WARNING_KMH) {
        Some("Szél: jelentős szél nem várható".to_string())
    } else {
        Some(format!("Szél: erősödő széllökések, max ~{} km/h", speed.normalize()))
    }
}

/// Sorted unique alert events, or the "no alert" line
pub fn alerts_block(alerts: &[WeatherAlert]) -> String {
    let mut events: Vec<&str> = alerts
        .iter()
        .map(|a| a.event.trim())
        .filter(|e| !e.is_empty())
        .collect();
    events.sort_unstable();
    events.dedup();

    if events.is_empty() {
        return "🆘 Jelenleg nincs érvényben riasztás a holnapi napra.\n\n".to_string();
    }

    let lines: Vec<String> = events.iter().map(|e| format!("- {}", e)).collect();
    format!("🆘 Riasztások:\n{}\n\n", lines.join("\n"))
}

fn weekday_and_date(date: NaiveDate) -> String {
    format!(
        "{}, {}",
        weekday_name(Language::Hungarian, date),
        date.format("%Y-%m-%d")
    )
}

// ============================================================================
// Articles
// ============================================================================

/// The two renditions written per scope
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleText {
    pub markdown: String,
    pub plain: String,
}

pub fn county_title(county: &str, date: NaiveDate) -> String {
    format!(
        "Milyen idő lesz holnap {} vármegyében? – {}",
        county,
        weekday_and_date(date)
    )
}

pub fn national_title(date: NaiveDate) -> String {
    format!("🌦️ Országos előrejelzés – {}", weekday_and_date(date))
}

pub fn county_lead(record: &AggregateRecord) -> String {
    format!(
        "{} Napközben a maximum elérheti a {} értéket, hajnalban {} várható. \
         Csapadék összességében {} körül valószínű a modellek szerint.",
        rain_emoji(record.max_precip_mm),
        format_temp(record.avg_max_temp_c),
        format_temp(record.avg_min_temp_c),
        format_precip(record.max_precip_mm)
    )
}

fn summary_lines(heading: &str, record: &AggregateRecord) -> String {
    let mut summary = format!(
        "{}:\n\n- Átlagos csúcs: {}\n- Átlagos minimum: {}\n- Csapadék (maximum): {}\n",
        heading,
        format_temp(record.avg_max_temp_c),
        format_temp(record.avg_min_temp_c),
        format_precip(record.max_precip_mm)
    );
    if let Some(wind) = wind_line(record.max_wind_kmh) {
        summary.push_str(&format!("- {}\n", wind));
    }
    summary.push('\n');
    summary
}

fn county_body(county: &str, record: &AggregateRecord) -> String {
    let mut body = summary_lines("Megyei összefoglaló", record);
    body.push_str(&alerts_block(&record.alerts));
    body.push_str(&format!(
        "{} kiemelt települései holnapi várható időjárása:\n\n",
        county
    ));
    for city in &record.member_cities {
        body.push_str(&format!(
            "- {}: maximum/minimum {} / {}, eső {}\n",
            city.name,
            format_temp(city.max_temp_c),
            format_temp(city.min_temp_c),
            format_precip(city.precip_mm)
        ));
    }
    body.push('\n');
    body.push_str(SOURCES_FOOTER);
    body.push('\n');
    body
}

/// County article: title, lead, summary, alerts and every member city
pub fn render_county_article(county: &str, date: NaiveDate, record: &AggregateRecord) -> ArticleText {
    let title = county_title(county, date);
    let lead = county_lead(record);
    let body = county_body(county, record);

    ArticleText {
        markdown: format!("# {}\n\n**Líd:** {}\n\n{}\n", title, lead, body),
        plain: format!("{}\n\n{}\n\n{}\n", title, lead, body),
    }
}

fn region_block(region: &AggregateRecord, preview_cities: usize) -> String {
    let mut head = format!(
        "**{}** — csúcs: {}, min: {}, csapadék (max): {}",
        region.scope_name,
        format_temp(region.avg_max_temp_c),
        format_temp(region.avg_min_temp_c),
        format_precip(region.max_precip_mm)
    );
    if let Some(wind) = wind_line(region.max_wind_kmh) {
        head.push_str(&format!("  |  {}", wind));
    }

    let lines: Vec<String> = region
        .preview(preview_cities)
        .iter()
        .map(|c| {
            format!(
                "- {}: {}/{}, eső {}",
                c.name,
                format_temp(c.max_temp_c),
                format_temp(c.min_temp_c),
                format_precip(c.precip_mm)
            )
        })
        .collect();

    format!("{}\n{}\n", head, lines.join("\n"))
}

/// National article with the country summary and one block per region
pub fn render_national_article(
    date: NaiveDate,
    nation: &AggregateRecord,
    regions: &[AggregateRecord],
    preview_cities: usize,
) -> ArticleText {
    let title = national_title(date);
    let lead = format!(
        "{} Napközben országosan átlagosan {}, hajnalban {}. A csapadék összességében {} körül alakulhat.",
        rain_emoji(nation.max_precip_mm),
        format_temp(nation.avg_max_temp_c),
        format_temp(nation.avg_min_temp_c),
        format_precip(nation.max_precip_mm)
    );

    let region_blocks: Vec<String> = regions
        .iter()
        .map(|r| region_block(r, preview_cities))
        .collect();

    let content = format!(
        "# {}\n\n**Líd:** {}\n\n{}{}{}\n{}\n",
        title,
        lead,
        summary_lines("Országos összefoglaló", nation),
        alerts_block(&nation.alerts),
        region_blocks.join("\n"),
        SOURCES_FOOTER
    );

    ArticleText {
        plain: format!("{}\n\n{}", title, content),
        markdown: content,
    }
}

// ============================================================================
// Per-city chat replies
// ============================================================================

/// "City (County, Country)"
pub fn location_label(place: &Place) -> String {
    let parts: Vec<&str> = [place.region_name.as_deref(), Some(place.country.as_str())]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        place.display_name.clone()
    } else {
        format!("{} ({})", place.display_name, parts.join(", "))
    }
}

/// Templated reply used whenever AI text is unavailable
pub fn render_city_message(
    lang: Language,
    place: &Place,
    forecast: &ConsensusForecast,
    day: TargetDay,
    date: NaiveDate,
) -> String {
    let header = format!(
        "{} {} – {} ({}, {})",
        rain_emoji(forecast.precipitation_mm),
        location_label(place),
        day.label(lang),
        weekday_name(lang, date),
        date.format("%Y-%m-%d")
    );
    let high = format_temp(forecast.day_max_temp_c);
    let low = format_temp(forecast.day_min_temp_c);
    let precip = format_precip(forecast.precipitation_mm);

    let lines = match lang {
        Language::Hungarian => [
            format!("• Csúcs: {} | Min: {}", high, low),
            format!("• Csapadék (max): {}", precip),
            "Forrás: Open-Meteo + OpenWeather (konszenzus)".to_string(),
        ],
        Language::English => [
            format!("• High: {} | Low: {}", high, low),
            format!("• Precipitation (max): {}", precip),
            "Source: Open-Meteo + OpenWeather (consensus)".to_string(),
        ],
        Language::Russian => [
            format!("• Максимум: {} | Минимум: {}", high, low),
            format!("• Осадки (макс.): {}", precip),
            "Источник: Open-Meteo + OpenWeather (консенсус)".to_string(),
        ],
    };

    format!("{}\n{}", header, lines.join("\n"))
}

/// System and user messages asking for a short forecast text
pub fn build_ai_prompt(
    lang: Language,
    place: &Place,
    forecast: &ConsensusForecast,
    day: TargetDay,
    date: NaiveDate,
) -> Vec<ChatMessage> {
    let loc = location_label(place);
    let when = format!(
        "{} ({}, {})",
        date.format("%Y-%m-%d"),
        weekday_name(lang, date),
        day.label(lang)
    );
    let high = round_one_decimal(forecast.day_max_temp_c);
    let low = round_one_decimal(forecast.day_min_temp_c);
    let precip = round_one_decimal(forecast.precipitation_mm);

    let (system, user) = match lang {
        Language::Hungarian => (
            "Te egy rövid, közérthető időjárás-előrejelzést írsz magyarul. \
             Legyen maximum 3 mondat. Ne írj semmi extrát, csak a szöveget."
                .to_string(),
            format!(
                "Hely: {}\nDátum: {}\nNappali csúcs: {:.1} °C\nÉjszakai minimum: {:.1} °C\n\
                 Várható csapadék maximum: {:.1} mm\n\n\
                 Fogalmazz természetes, emberi hangon, néhány szóban utalj rá, \
                 hogy esernyőre vagy kabátra szükség lehet-e.",
                loc, when, high, low, precip
            ),
        ),
        Language::English => (
            "You write a short, clear weather forecast in English. \
             Maximum 3 sentences. Output only the text, nothing else."
                .to_string(),
            format!(
                "Location: {}\nDate: {}\nDaytime high: {:.1} °C\nNighttime low: {:.1} °C\n\
                 Expected max precipitation: {:.1} mm\n\n\
                 Write in a natural tone and mention briefly if an umbrella or a jacket might be needed.",
                loc, when, high, low, precip
            ),
        ),
        Language::Russian => (
            "Ты пишешь короткий, понятный прогноз погоды на русском языке. \
             Не более 3 предложений. Никаких лишних комментариев, только текст."
                .to_string(),
            format!(
                "Место: {}\nДата: {}\nДневной максимум: {:.1} °C\nНочной минимум: {:.1} °C\n\
                 Ожидаемые осадки (максимум): {:.1} мм\n\n\
                 Напиши естественным тоном и упомяни, понадобится ли зонт или тёплая одежда.",
                loc, when, high, low, precip
            ),
        ),
    };

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}
