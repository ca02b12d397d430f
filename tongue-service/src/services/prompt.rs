//! Fixed prompt and response schema sent with every diagnosis request.

use serde_json::{json, Value};

pub const SYSTEM_INSTRUCTION: &str = r#"You are a highly experienced Traditional Chinese Medicine (TCM) practitioner (老中医) with 40 years of experience in tongue diagnosis (舌诊).
Your task is to analyze the image of a tongue provided by the user.

You must analyze the tongue based on these key aspects:
1. Tongue Body (舌质): Color, Shape, Moisture.
2. Tongue Coating (舌苔): Color, Thickness, Nature.
3. Overall Syndrome Differentiation (辨证): Identify the TCM syndrome.
4. Physical Symptoms (身体症状): Infer likely physical symptoms.
5. Meridian Balance (经络辨证): Analyze which specific meridians (经络) are affected (e.g., Spleen Meridian, Liver Meridian) and their status (e.g., blocked, deficient).
6. Comprehensive Recommendations (调理建议): Provide advice on Diet, Lifestyle, Food Therapy (食疗), and suggested Traditional Herbal Formulas (中药方剂/中成药).

Output Language: Chinese (Simplified).
Tone: Professional, empathetic, and authoritative yet accessible.

If the image is not a tongue or is too blurry to read, indicate this in the 'overview' field clearly, but try to provide a best-effort analysis if possible or set fields to "无法辨识"."#;

pub const USER_PROMPT: &str =
    "请根据这张图片进行专业的中医舌诊分析。如果图片不是舌头，请在overview中说明。";

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn string_list(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description
    })
}

/// Response schema in the Gemini `Schema` dialect.
///
/// Mirrors [`crate::models::DiagnosisResult`]; every property is required.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overview": string("A brief, one-sentence summary of the overall tongue appearance."),
            "tongueBody": {
                "type": "OBJECT",
                "properties": {
                    "color": string("Color of the tongue body (e.g., 淡红, 红, 紫暗)"),
                    "shape": string("Shape details (e.g., 胖大, 瘦薄, 齿痕, 裂纹)"),
                    "moisture": string("Moisture level (e.g., 润, 燥, 滑)"),
                    "analysis": string("What this body condition implies in TCM terms.")
                },
                "required": ["color", "shape", "moisture", "analysis"]
            },
            "tongueCoating": {
                "type": "OBJECT",
                "properties": {
                    "color": string("Color of the coating (e.g., 薄白, 黄, 灰黑)"),
                    "thickness": string("Thickness (e.g., 薄, 厚)"),
                    "nature": string("Texture nature (e.g., 腻, 腐, 剥落)"),
                    "analysis": string("What this coating implies in TCM terms.")
                },
                "required": ["color", "thickness", "nature", "analysis"]
            },
            "syndrome": {
                "type": "OBJECT",
                "properties": {
                    "name": string("The specific TCM syndrome diagnosis (e.g., 脾虚湿盛)"),
                    "description": string("Explanation of the syndrome."),
                    "organsInvolved": string_list("List of Zang-Fu organs involved (e.g., 脾, 胃, 肝)")
                },
                "required": ["name", "description", "organsInvolved"]
            },
            "symptoms": string_list(
                "List of 3-5 common physical symptoms associated with this diagnosis (e.g., 失眠, 腹胀, 乏力)."
            ),
            "meridianAnalysis": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": string("Name of the meridian (e.g. 足太阴脾经)."),
                        "status": string("Condition of the meridian (e.g. 气虚, 湿阻)."),
                        "description": string("Brief explanation of the impact.")
                    },
                    "required": ["name", "status", "description"]
                },
                "description": "Analysis of the most affected meridians based on the tongue diagnosis."
            },
            "recommendations": {
                "type": "OBJECT",
                "properties": {
                    "diet": string_list("Specific dietary advice (foods to eat/avoid)."),
                    "lifestyle": string_list("Lifestyle changes (sleep, exercise, emotions)."),
                    "herbsOrFoods": string_list(
                        "Specific medicinal foods or mild herbs suitable for diet therapy (e.g., 薏米, 山药)."
                    ),
                    "tcmFormulas": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "name": string("Name of the classic herbal formula or patent medicine (e.g., 六味地黄丸)."),
                                "description": string("Brief description of what this formula does.")
                            },
                            "required": ["name", "description"]
                        },
                        "description": "Suggested TCM herbal formulas or patent medicines (中成药) relevant to the syndrome."
                    }
                },
                "required": ["diet", "lifestyle", "herbsOrFoods", "tcmFormulas"]
            }
        },
        "required": [
            "overview",
            "tongueBody",
            "tongueCoating",
            "syndrome",
            "symptoms",
            "meridianAnalysis",
            "recommendations"
        ]
    })
}
