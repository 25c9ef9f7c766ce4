/// SQL 템플릿
/// 렐름 테이블 이름은 고정 렐름 목록에서만 만들어지며, 사용자 입력은 항상 바인딩 파라미터로 전달한다.
use crate::realm::Realm;

/// 경매 행 컬럼 (스테이징 파일 컬럼 순서와 동일)
const AUCTION_COLUMNS: &str =
    "faction, wow_id, wow_item_id, buyout, quantity, api_request_time, time_left";

/// 렐름 경매 테이블 생성
pub fn create_realm_table(realm: &Realm) -> String {
    let table = realm.table_name();
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id BIGSERIAL PRIMARY KEY,
            faction CHAR(1) NOT NULL,
            wow_id BIGINT NOT NULL,
            wow_item_id INT NOT NULL,
            buyout BIGINT NOT NULL CHECK (buyout > 0),
            quantity INT NOT NULL CHECK (quantity >= 1),
            api_request_time TIMESTAMP NOT NULL,
            time_left SMALLINT NOT NULL CHECK (time_left BETWEEN 1 AND 4)
        );
        CREATE INDEX IF NOT EXISTS {table}_faction_item_idx ON {table} (faction, wow_item_id);
        CREATE INDEX IF NOT EXISTS {table}_request_time_idx ON {table} (api_request_time)
        "#
    )
}

/// 스테이징 파일 일괄 적재 (헤더 포함 CSV, 쉼표 구분)
pub fn copy_auctions(realm: &Realm) -> String {
    format!(
        "COPY {} ({AUCTION_COLUMNS}) FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER ',')",
        realm.table_name()
    )
}

/// 렐름 경매 전체 삭제 (유지보수용)
pub fn delete_realm_auctions(realm: &Realm) -> String {
    format!("DELETE FROM {}", realm.table_name())
}

/// 아이템 가격 원본 조회 (모든 수집 시각)
pub fn read_item_prices(realm: &Realm) -> String {
    format!(
        "SELECT buyout, api_request_time, quantity FROM {} WHERE faction = $1 AND wow_item_id = $2",
        realm.table_name()
    )
}

/// 최신 수집분 경매 조회 (아이템 이름 부분 일치, 페이지네이션)
pub fn read_live_auctions(realm: &Realm) -> String {
    let table = realm.table_name();
    format!(
        r#"
        SELECT
            a.wow_id,
            a.wow_item_id,
            a.buyout,
            a.quantity,
            a.time_left,
            i.name AS item_name
        FROM {table} a
        JOIN item_data i ON a.wow_item_id = i.wow_item_id
        WHERE a.faction = $1
          AND a.api_request_time = ({LATEST_REQUEST_TIME})
          AND i.name LIKE '%' || $2 || '%'
        ORDER BY a.wow_id
        OFFSET $3 LIMIT $4
        "#
    )
}

/// 가장 최근 실행 시각
pub const LATEST_REQUEST_TIME: &str =
    "SELECT api_request_time FROM api_request_time_record ORDER BY id DESC LIMIT 1";

/// 실행 기록 추가
pub const INSERT_RUN: &str = r#"
    INSERT INTO api_request_time_record (api_request_time)
    VALUES ($1)
    RETURNING id, api_request_time
"#;

/// 실행 기록 테이블 생성
pub const CREATE_RUN_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS api_request_time_record (
        id BIGSERIAL PRIMARY KEY,
        api_request_time TIMESTAMP NOT NULL
    )
"#;

/// 아이템 테이블 생성 (외부에서 채워지는 읽기 전용 데이터)
pub const CREATE_ITEM_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS item_data (
        wow_item_id INT PRIMARY KEY,
        name VARCHAR NOT NULL,
        name_slug VARCHAR,
        "class" VARCHAR,
        subclass VARCHAR,
        slot VARCHAR,
        quality VARCHAR,
        icon_url TEXT
    )
"#;

/// 아이템 검색 (이름 부분 일치, 페이지네이션)
pub const SEARCH_ITEMS: &str = r#"
    SELECT wow_item_id, name, name_slug, "class", subclass, slot, quality, icon_url
    FROM item_data
    WHERE name LIKE '%' || $1 || '%'
    ORDER BY wow_item_id
    OFFSET $2 LIMIT $3
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const REALM: Realm = Realm {
        id: 4742,
        name: "ashbringer",
    };

    #[test]
    fn copy_statement_lists_columns_in_staging_order() {
        assert_eq!(
            copy_auctions(&REALM),
            "COPY realm_ashbringer (faction, wow_id, wow_item_id, buyout, quantity, api_request_time, time_left) \
             FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER ',')"
        );
    }

    #[test]
    fn realm_queries_target_realm_table() {
        assert!(read_item_prices(&REALM).contains("FROM realm_ashbringer"));
        assert!(read_live_auctions(&REALM).contains("FROM realm_ashbringer a"));
        assert_eq!(delete_realm_auctions(&REALM), "DELETE FROM realm_ashbringer");
    }
}
