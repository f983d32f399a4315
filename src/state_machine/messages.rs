//! User-facing text
//!
//! Trigger literals double as quick action text, so a selected quick action
//! re-enters the machine exactly as if the user had typed it.

pub const FACILITY_TRIGGER: &str = "医療機関を知りたい";
pub const DRUG_TRIGGER: &str = "薬について聞きたい";

pub const ASK_DEPARTMENT: &str = "承知しました。何科を受診したいですか？";
pub const ASK_DRUG_NAME: &str =
    "私が提供できるのはお薬の副作用または使い方についてです。調べたいお薬の名前をできるだけ正確に教えてください。";
pub const ASK_INFO_TYPE: &str = "そのお薬について、副作用、使い方のどちらを調べますか？";
pub const SEND_LOCATION_LABEL: &str = "位置情報を送信";
pub const INVALID_SELECTION: &str = "無効な選択です。もう一度お試しください。";
pub const NO_DEPARTMENT: &str = "診療科目が選択されていません。もう一度お試しください。";
pub const DEFAULT_MENU: &str = "お役に立てることはありますか？";

pub const FACILITIES_HEADER: &str = "お近くの医療機関はこちらです：";
pub const NO_FACILITIES: &str = "お近くに該当する医療機関が見つかりませんでした。";
pub const SEARCH_FAILED: &str = "医療機関の検索中にエラーが発生しました。";
pub const DRUG_LOOKUP_FAILED: &str = "申し訳ありません。お薬の情報を取得できませんでした。";
pub const DRUG_INFO_NOT_FOUND: &str = "申し訳ありません。該当するお薬の情報が見つかりませんでした。";
pub const SUMMARY_FAILED: &str = "申し訳ありません。レスポンスの生成中にエラーが発生しました。";
pub const GENERIC_APOLOGY: &str = "申し訳ありませんが、処理中にエラーが発生しました。";

/// Placeholder for optional facility fields
pub const NOT_AVAILABLE: &str = "N/A";

pub fn ask_location(department: &str) -> String {
    format!("{department}ですね。それではお近くの医療機関を検索しますので、位置情報を送信してください。")
}
