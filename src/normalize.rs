//! タスク文字列の正規化・カテゴリ判定・前方一致マッチ。
//! どれも決定的な純関数で、集約パスと統計側から共用する。

/// `3件` のような数量表現で数字を N に畳む単位
const COUNT_UNITS: &[char] = &['件', '分', '名', '案', 'つ', '個'];

/// 正規化で落とす助詞と句読点
const STRIP_CHARS: &[char] = &['を', 'に', 'の', '、', '。'];

const NORMALIZED_MAX_CHARS: usize = 30;

/// 前方一致マッチで比較するプレフィックス長
const MATCH_PREFIX_CHARS: usize = 10;

pub const CATEGORY_OTHER: &str = "その他";

/// カテゴリ判定の規則表。宣言順が優先順位で、最初に当たったものが勝つ。
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("クライアント対応", &["クライアント", "顧客", "商談", "ヒアリング", "提案", "要件"]),
    ("資料作成", &["資料", "スライド", "提案書", "企画書", "レポート", "作成"]),
    ("会議・打ち合わせ", &["会議", "ミーティング", "打ち合わせ", "スタンドアップ", "キックオフ", "レビュー"]),
    ("システム・開発", &["システム", "バグ", "デプロイ", "メンテナンス", "ワークフロー", "実装"]),
    ("セミナー・講座", &["セミナー", "講座", "会場", "告知", "参加者", "ハンズオン"]),
    ("広告・マーケティング", &["広告", "キャンペーン", "クリエイティブ", "ABテスト", "マーケティング"]),
    ("動画・コンテンツ", &["動画", "編集", "フィードバック", "コンテンツ"]),
];

/// 類似タスクを同一視するための正規化。
/// 数量は `N件` 形式に畳み、残りの数字と主要助詞を除去して先頭30文字に切り詰める。
pub fn normalize_task(task: &str) -> String {
    let mut out = String::with_capacity(task.len());
    let mut chars = task.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            while matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
                chars.next();
            }
            // 直後が数量単位なら N を残し、そうでなければ数字ごと落とす
            if matches!(chars.peek(), Some(u) if COUNT_UNITS.contains(u)) {
                out.push('N');
            }
            continue;
        }
        if STRIP_CHARS.contains(&c) {
            continue;
        }
        out.push(c);
    }

    let truncated: String = out.trim().chars().take(NORMALIZED_MAX_CHARS).collect();
    // 切り詰めで末尾に空白が出ると normalize が冪等でなくなる
    truncated.trim_end().to_string()
}

/// 前方一致による類似判定。どちらかが相手の先頭10文字を含めばマッチ。
/// 短い正規化文字列では誤検出し得るが、既知のヒューリスティクスとして据え置く。
pub fn prefix_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let prefix_a: String = a.chars().take(MATCH_PREFIX_CHARS).collect();
    let prefix_b: String = b.chars().take(MATCH_PREFIX_CHARS).collect();
    a.contains(&prefix_b) || b.contains(&prefix_a)
}

/// キーワード含有でカテゴリを決める。どれにも当たらなければ「その他」。
pub fn categorize_task(task: &str) -> &'static str {
    let lower = task.to_lowercase();
    for (label, keywords) in CATEGORIES {
        for keyword in *keywords {
            if lower.contains(&keyword.to_lowercase()) {
                return label;
            }
        }
    }
    CATEGORY_OTHER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_counts_and_particles() {
        assert_eq!(
            normalize_task("クライアントに3件のメールを送信した"),
            "クライアントN件メール送信した"
        );
    }

    #[test]
    fn normalize_keeps_unit_with_placeholder() {
        assert_eq!(normalize_task("参加者15名の名簿を確認"), "参加者N名名簿確認");
        assert_eq!(normalize_task("バナー3案を提出"), "バナーN案提出");
    }

    #[test]
    fn normalize_strips_bare_digits() {
        assert_eq!(normalize_task("第3四半期レポート2024"), "第四半期レポート");
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_task("  資料を作成  "), "資料作成");
    }

    #[test]
    fn normalize_truncates_to_30_chars() {
        let long = "あ".repeat(40);
        assert_eq!(normalize_task(&long).chars().count(), 30);
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "クライアントに3件のメールを送信した",
            "セミナー会場の下見と設営、参加者30名分の資料を印刷",
            "  2024年の広告キャンペーンを企画。ABテストを5案設定  ",
            "バグ修正を2件デプロイした。",
        ];
        for s in samples {
            let once = normalize_task(s);
            assert_eq!(normalize_task(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn prefix_match_contains_short_string() {
        // 10文字未満の文字列はそれ全体が相手に含まれればマッチ
        assert!(prefix_match("資料作成する", "資料作成"));
        assert!(prefix_match("資料作成", "資料作成する"));
    }

    #[test]
    fn prefix_match_long_strings_share_prefix() {
        let a = "クライアント定例ミーティング準備";
        let b = "クライアント定例ミーティング実施と議事録共有";
        assert!(prefix_match(a, b));
    }

    #[test]
    fn prefix_match_rejects_unrelated() {
        assert!(!prefix_match("資料作成する", "動画編集完了"));
    }

    #[test]
    fn prefix_match_rejects_empty() {
        assert!(!prefix_match("", "資料作成"));
        assert!(!prefix_match("資料作成", ""));
    }

    #[test]
    fn categorize_meeting_keyword() {
        assert_eq!(categorize_task("週次の定例会議に参加"), "会議・打ち合わせ");
    }

    #[test]
    fn categorize_first_match_wins() {
        // クライアント対応が資料作成より先に宣言されている
        assert_eq!(categorize_task("クライアント向け資料の作成"), "クライアント対応");
    }

    #[test]
    fn categorize_is_case_insensitive() {
        assert_eq!(categorize_task("LPのabテストを設定"), "広告・マーケティング");
    }

    #[test]
    fn categorize_falls_back_to_other() {
        assert_eq!(categorize_task("郵便局で切手購入"), CATEGORY_OTHER);
    }
}
