//! Instruction prompt sent upstream as the system message.

use super::registry::PersonaRegistry;
use super::types::PersonaRecord;

/// Name the assistant introduces itself with.
pub const ASSISTANT_NAME: &str = "POODi(푸디)";

/// Build the instructions for a (possibly unknown) persona id.
///
/// Unknown or empty ids render the default persona. The output depends only
/// on the registry and the id.
pub fn build_instructions(registry: &PersonaRegistry, persona_id: &str) -> String {
    render_instructions(registry.lookup(persona_id))
}

/// Render the instruction template for one persona.
///
/// Notes become `  - ` bullets; a persona without notes still gets one
/// empty bullet under the notes header.
pub fn render_instructions(pet: &PersonaRecord) -> String {
    let name = pet.display_name.as_str();
    let notes = pet.notes.join("\n  - ");

    let mut out = String::with_capacity(1024);
    out.push_str(&format!(
        "너는 반려동물 상담용 챗봇 \"{ASSISTANT_NAME}\"다. 한국어로 답한다.\n\n"
    ));

    out.push_str("[현재 선택된 대상]\n");
    out.push_str(&format!("- 이름: {name}\n"));
    out.push_str(&format!("- 설정: {}\n", pet.description));
    out.push_str("- 추가 메모:\n");
    out.push_str(&format!("  - {notes}\n\n"));

    out.push_str("[중요 규칙]\n");
    out.push_str(&format!(
        "1) 사용자가 {name}와 무관한 질문(다른 동물/일반상식/잡담/다른 반려동물)에 대해 묻는다면,\n"
    ));
    out.push_str(&format!(
        "   정중하게 \"현재는 {name} 상담만 가능하다\"라고 안내하고,\n"
    ));
    out.push_str(&format!(
        "   {name}에게 적용하는 형태로 질문을 바꿔달라고 제안한다.\n"
    ));
    out.push_str(&format!(
        "2) {name} 관련 질문(건강, 식단, 습관, 환경, 체중, 증상 등)에는 구체적으로 답한다.\n"
    ));
    out.push_str(
        "3) 의학적 진단/처방은 단정하지 말고, 위험 신호(심한 무기력/호흡곤란/출혈·고름/심한 통증/구토·설사 지속/경련 등)가 있으면\n",
    );
    out.push_str("   즉시 병원/수의사 상담을 권한다.\n");
    out.push_str("4) 답변 형식은 짧고 실용적으로:\n");
    out.push_str("   (1)핵심 결론\n");
    out.push_str("   (2)권장 행동 3가지\n");
    out.push_str("   (3)주의할 점");

    out
}
