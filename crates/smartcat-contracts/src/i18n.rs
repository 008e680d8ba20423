//! Localized user-visible text.
//!
//! Every prompt fragment and refusal message the relay can emit lives in one
//! table keyed by `(MessageId, Language)`, so the vision and chat paths never
//! carry their own copies.

/// JSON shape the vision model must answer with.
pub const JSON_SHAPE: &str = r#"{"catVisible": true|false, "summary": "...", "careTips": "..."}"#;

/// Exact literal the model must return when no cat is visible.
pub const EMPTY_VERDICT: &str = r#"{"catVisible":false,"summary":"","careTips":""}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    /// Case-insensitive `zh` prefix selects Chinese; anything else is English.
    pub fn detect(tag: &str) -> Self {
        let lowered = tag.to_ascii_lowercase();
        if lowered.starts_with("zh") {
            Language::Chinese
        } else {
            Language::English
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    VisionSystem,
    VisionCaution,
    TooDark,
    TooBright,
    LowDetail,
    NoSubject,
    Unreadable,
    LimitedInfo,
}

struct LocalizedText {
    id: MessageId,
    en: &'static str,
    zh: &'static str,
}

const TABLE: &[LocalizedText] = &[
    LocalizedText {
        id: MessageId::VisionSystem,
        en: r#"You are the Smart Cat Home vision assistant. Respond ONLY with JSON matching {"catVisible": true|false, "summary": "...", "careTips": "..."} and nothing more. If no real cat is visible, return {"catVisible":false,"summary":"","careTips":""} and stop—never hallucinate details."#,
        zh: r#"你是 Smart Cat Home 的視覺檢查助手。回覆必須是純 JSON：{"catVisible": true|false, "summary": "...", "careTips": "..."}。若畫面沒有看到真實貓咪，就輸出 {"catVisible":false,"summary":"","careTips":""} 並停止，絕對不能杜撰細節。"#,
    },
    LocalizedText {
        id: MessageId::VisionCaution,
        en: r#"Return JSON only in the format {"catVisible": true|false, "summary": "...", "careTips": "..."}. If no cat is visible, respond exactly {"catVisible":false,"summary":"","careTips":""} and nothing else. If the scene is unclear or too dark/blurry, say so explicitly—never guess."#,
        zh: r#"僅能輸出 JSON：{"catVisible": true|false, "summary": "...", "careTips": "..."}。若沒有貓咪，必須回覆 {"catVisible":false,"summary":"","careTips":""} 並立即結束。畫面模糊或過暗要直接說明，禁止臆測。"#,
    },
    LocalizedText {
        id: MessageId::TooDark,
        en: "The photo appears almost completely dark, so I can’t see the habitat. Please retake it with more light.",
        zh: "影像幾乎全黑，看不到貓咪環境，請在光線足夠時重新拍攝。",
    },
    LocalizedText {
        id: MessageId::TooBright,
        en: "The photo is overexposed, so no details are visible. Please adjust the lighting and try again.",
        zh: "影像幾乎全白或過曝，看不到細節，請調整曝光後再拍攝。",
    },
    LocalizedText {
        id: MessageId::LowDetail,
        en: "The photo doesn’t contain enough detail to analyse. Please retake it closer or describe the situation in text.",
        zh: "影像細節不足，無法判讀。請重新拍一張更清楚的照片或改用文字描述。",
    },
    LocalizedText {
        id: MessageId::NoSubject,
        en: "No cat is visible. Please retake the photo or describe the situation in text.",
        zh: "未看到貓咪，請重新拍攝或改用文字描述。",
    },
    LocalizedText {
        id: MessageId::Unreadable,
        en: "This photo can’t be interpreted right now. Please try a clearer photo or describe what you observed.",
        zh: "這張照片目前無法判讀，請換張更清楚的照片或直接描述你觀察到的狀況。",
    },
    LocalizedText {
        id: MessageId::LimitedInfo,
        en: "This photo carries little usable information. Please add a description or provide another photo.",
        zh: "這張照片的資訊有限，請再補充描述或提供另一張照片。",
    },
];

pub fn localized(id: MessageId, language: Language) -> &'static str {
    let Some(row) = TABLE.iter().find(|row| row.id == id) else {
        return "";
    };
    match language {
        Language::English => row.en,
        Language::Chinese => row.zh,
    }
}
