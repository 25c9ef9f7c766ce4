/// 렐름(서버) 및 진영 참조 테이블
/// 모든 컴포넌트가 상속이 아닌 참조로 공유하는 읽기 전용 상수
// region:    --- Imports
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// endregion: --- Imports

// region:    --- Realm
/// 렐름 모델
/// `name` 은 파티션 테이블 이름(`realm_<name>`)의 접미사로 사용된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Realm {
    pub id: i32,
    pub name: &'static str,
}

impl Realm {
    const fn new(id: i32, name: &'static str) -> Self {
        Self { id, name }
    }

    /// 렐름 경매 테이블 이름
    pub fn table_name(&self) -> String {
        format!("realm_{}", self.name)
    }
}

/// EU 클래식 렐름 목록 (고정, 런타임에 생성/삭제되지 않음)
pub const REALMS: [Realm; 43] = [
    Realm::new(4440, "everlook"),
    Realm::new(4441, "auberdine"),
    Realm::new(4442, "lakeshire"),
    Realm::new(4452, "chromie"),
    Realm::new(4453, "pyrewood_village"),
    Realm::new(4454, "mirage_raceway"),
    Realm::new(4455, "razorfen"),
    Realm::new(4456, "nethergarde_keep"),
    Realm::new(4463, "lucifron"),
    Realm::new(4464, "sulfuron"),
    Realm::new(4465, "golemagg"),
    Realm::new(4466, "patchwerk"),
    Realm::new(4467, "firemaw"),
    Realm::new(4474, "flamegor"),
    Realm::new(4475, "shazzrah"),
    Realm::new(4476, "gehennas"),
    Realm::new(4477, "venoxis"),
    Realm::new(4478, "razorgore"),
    Realm::new(4676, "zandalar_tribe"),
    Realm::new(4678, "hydraxian_waterlords"),
    Realm::new(4701, "mograine"),
    Realm::new(4702, "gandling"),
    Realm::new(4703, "amnennar"),
    Realm::new(4704, "wyrmthalak"),
    Realm::new(4705, "stonespine"),
    Realm::new(4706, "flamelash"),
    Realm::new(4741, "noggenfogger"),
    Realm::new(4742, "ashbringer"),
    Realm::new(4743, "skullflame"),
    Realm::new(4744, "finkle"),
    Realm::new(4745, "transcendence"),
    Realm::new(4746, "bloodfang"),
    Realm::new(4749, "earthshaker"),
    Realm::new(4751, "dragonfang"),
    Realm::new(4754, "rhok_delar"),
    Realm::new(4755, "dreadmist"),
    Realm::new(4756, "dragon_s_call"),
    Realm::new(4757, "ten_storms"),
    Realm::new(4758, "judgement"),
    Realm::new(4759, "celebras"),
    Realm::new(4763, "heartstriker"),
    Realm::new(4766, "harbinger_of_doom"),
    Realm::new(4813, "mandokir"),
];

/// 이름으로 렐름 조회
pub fn find_by_name(name: &str) -> Option<&'static Realm> {
    REALMS.iter().find(|realm| realm.name == name)
}

/// id 로 렐름 조회
pub fn find_by_id(id: i32) -> Option<&'static Realm> {
    REALMS.iter().find(|realm| realm.id == id)
}
// endregion: --- Realm

// region:    --- Faction
/// 진영 (진영마다 별도의 경매장을 가진다)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Alliance,
    Horde,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Alliance, Faction::Horde];

    /// 테이블에 저장되는 한 글자 진영 표기
    pub fn sign(&self) -> char {
        match self {
            Faction::Alliance => 'a',
            Faction::Horde => 'h',
        }
    }

    /// 외부 API 의 경매장 카테고리 코드
    pub fn auction_house_id(&self) -> u8 {
        match self {
            Faction::Alliance => 2,
            Faction::Horde => 6,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sign())
    }
}

impl FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "alliance" => Ok(Faction::Alliance),
            "h" | "horde" => Ok(Faction::Horde),
            other => Err(other.to_string()),
        }
    }
}
// endregion: --- Faction

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn realm_ids_and_names_are_unique() {
        let ids: HashSet<_> = REALMS.iter().map(|r| r.id).collect();
        let names: HashSet<_> = REALMS.iter().map(|r| r.name).collect();
        assert_eq!(ids.len(), REALMS.len());
        assert_eq!(names.len(), REALMS.len());
    }

    #[test]
    fn lookup_by_name_and_id() {
        assert_eq!(find_by_name("gehennas").map(|r| r.id), Some(4476));
        assert_eq!(find_by_id(4813).map(|r| r.name), Some("mandokir"));
        assert!(find_by_name("stormwind").is_none());
        assert_eq!(REALMS[0].table_name(), "realm_everlook");
    }

    #[test]
    fn faction_codes() {
        assert_eq!(Faction::Alliance.auction_house_id(), 2);
        assert_eq!(Faction::Horde.auction_house_id(), 6);
        assert_eq!("h".parse::<Faction>(), Ok(Faction::Horde));
        assert_eq!("alliance".parse::<Faction>(), Ok(Faction::Alliance));
        assert!("x".parse::<Faction>().is_err());
    }
}
