//! 부팅 과정 터미널 출력
//!
//! 레지스트리 초기화 진행 상황을 박스 제목과 트리 형태로 보여 줍니다.
//! 문자열을 만드는 `format_*` 함수와 이를 출력하는 `print_*` 함수로 나뉩니다.
//!
//! ```text
//! ╔══════════════════════════════════════════════════╗
//! ║         🔄 INITIALIZING SERVICE REGISTRY         ║
//! ╚══════════════════════════════════════════════════╝
//! → Step 1: Creating Repository instances
//!    ├─ user_repository: ✓ Created
//! ✓ Step 1: Repository instances created (1 items)
//! ```

const BOX_WIDTH: usize = 50;

/// 50칸 박스 안에 가운데 정렬된 제목
pub fn format_boxed_title(title: &str) -> String {
    let border = "═".repeat(BOX_WIDTH);
    format!("╔{border}╗\n║{:^width$}║\n╚{border}╝", title, width = BOX_WIDTH)
}

pub fn print_boxed_title(title: &str) {
    println!("{}", format_boxed_title(title));
}

pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

pub fn format_sub_task(name: &str, status: &str) -> String {
    format!("   ├─ {}: {}", name, status)
}

pub fn print_sub_task(name: &str, status: &str) {
    println!("{}", format_sub_task(name, status));
}

/// 레지스트리 초기화 요약 (리포지토리/서비스/합계)
pub fn print_final_summary(repos: usize, services: usize) {
    println!();
    print_boxed_title("🎉 SERVICE REGISTRY INITIALIZED");
    println!("   📦 Repositories: {}", repos);
    println!("   🔧 Services: {}", services);
    println!("   🚀 Total Components: {}", repos + services);
    println!();
}

/// 이름 → 생성자 인덱스가 만들어졌음을 알립니다. (`kind`: "Service" | "Repository")
pub fn print_cache_initialized(kind: &str, count: usize) {
    println!("{}", format_sub_task(&format!("{} index", kind), &format!("{} constructors", count)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_title_has_fixed_width() {
        let boxed = format_boxed_title("READY");
        let lines: Vec<_> = boxed.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].chars().count(), BOX_WIDTH + 2);
        assert!(lines[1].contains("READY"));
        assert!(lines[1].starts_with('║') && lines[1].ends_with('║'));
    }

    #[test]
    fn test_sub_task_is_indented_tree_item() {
        assert_eq!(format_sub_task("user_service", "✓ Created"), "   ├─ user_service: ✓ Created");
    }
}
