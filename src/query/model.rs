use serde::{Deserialize, Serialize};

// 아이템 모델 (외부에서 채워지는 데이터)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemData {
    pub wow_item_id: i32,
    pub name: String,
    pub name_slug: Option<String>,
    pub class: Option<String>,
    pub subclass: Option<String>,
    pub slot: Option<String>,
    pub quality: Option<String>,
    pub icon_url: Option<String>,
}

// 최신 경매 조회 행
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LiveAuctionRow {
    pub wow_id: i64,
    pub wow_item_id: i32,
    pub buyout: i64,
    pub quantity: i32,
    pub time_left: i16,
    pub item_name: String,
}

// 최신 경매 응답
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveAuction {
    pub auction_id: i64,
    pub data: LiveAuctionData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveAuctionData {
    pub wow_item_id: i32,
    pub buyout: i64,
    pub quantity: i32,
    pub time_left: i16,
    pub item_name: String,
}

impl From<LiveAuctionRow> for LiveAuction {
    fn from(row: LiveAuctionRow) -> Self {
        Self {
            auction_id: row.wow_id,
            data: LiveAuctionData {
                wow_item_id: row.wow_item_id,
                buyout: row.buyout,
                quantity: row.quantity,
                time_left: row.time_left,
                item_name: row.item_name,
            },
        }
    }
}
