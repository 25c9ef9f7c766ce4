/// 가격 통계 계산
/// 수집 시각별 단위 가격 관측값으로부터 최저가, 평균, 중앙값, 건수를 계산한다.
/// 네 가지 통계는 같은 불변 입력에 대해 동시에 계산되고, 모두 끝난 뒤 하나로 합쳐진다.
// region:    --- Imports
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::{spawn_blocking, JoinError};
use tracing::debug;

// endregion: --- Imports

// region:    --- Model
/// 수집 시각 표기 형식 (문자열 정렬 순서 = 시간 순서)
pub const TIME_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 수집 시각 -> 단위 가격 목록
pub type PriceObservations = BTreeMap<String, Vec<f64>>;

/// 아이템 가격 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemStatistics {
    pub lowest: BTreeMap<String, f64>,
    pub mean: BTreeMap<String, f64>,
    pub median: BTreeMap<String, f64>,
    pub count: BTreeMap<String, usize>,
}
// endregion: --- Model

// region:    --- Grouping
/// (즉시 구매가, 수집 시각, 수량) 행을 수집 시각별 단위 가격으로 묶는다.
/// 수량이 1 미만인 행은 단위 가격을 정의할 수 없으므로 제외한다.
pub fn group_observations<I>(rows: I) -> PriceObservations
where
    I: IntoIterator<Item = (i64, NaiveDateTime, i32)>,
{
    let mut observations = PriceObservations::new();
    for (buyout, api_request_time, quantity) in rows {
        if quantity < 1 {
            continue;
        }
        observations
            .entry(api_request_time.format(TIME_KEY_FORMAT).to_string())
            .or_default()
            .push(buyout as f64 / quantity as f64);
    }
    observations
}
// endregion: --- Grouping

// region:    --- Statistics
pub fn lowest(data: &PriceObservations) -> BTreeMap<String, f64> {
    per_group(data, |prices| prices.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn mean(data: &PriceObservations) -> BTreeMap<String, f64> {
    per_group(data, |prices| prices.iter().sum::<f64>() / prices.len() as f64)
}

/// 짝수 개수일 때는 가운데 두 값의 평균
pub fn median(data: &PriceObservations) -> BTreeMap<String, f64> {
    per_group(data, |prices| {
        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    })
}

pub fn count(data: &PriceObservations) -> BTreeMap<String, usize> {
    data.iter()
        .map(|(time, prices)| (time.clone(), prices.len()))
        .collect()
}

/// 빈 그룹은 통계가 정의되지 않으므로 결과에서 제외
fn per_group<T>(data: &PriceObservations, f: impl Fn(&[f64]) -> T) -> BTreeMap<String, T> {
    data.iter()
        .filter(|(_, prices)| !prices.is_empty())
        .map(|(time, prices)| (time.clone(), f(prices)))
        .collect()
}

/// 네 가지 통계를 동시에 계산
pub async fn compute(data: PriceObservations) -> Result<ItemStatistics, JoinError> {
    debug!("{:<12} --> 통계 계산 시작: groups={}", "Stats", data.len());
    let data = Arc::new(data);

    let (lowest, mean, median, count) = tokio::try_join!(
        spawn_blocking({
            let data = Arc::clone(&data);
            move || lowest(&data)
        }),
        spawn_blocking({
            let data = Arc::clone(&data);
            move || mean(&data)
        }),
        spawn_blocking({
            let data = Arc::clone(&data);
            move || median(&data)
        }),
        spawn_blocking({
            let data = Arc::clone(&data);
            move || count(&data)
        }),
    )?;

    Ok(ItemStatistics {
        lowest,
        mean,
        median,
        count,
    })
}
// endregion: --- Statistics

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const T1: &str = "2021-03-14 12:00:00";
    const T2: &str = "2021-03-14 13:00:00";

    fn observations(groups: &[(&str, &[f64])]) -> PriceObservations {
        groups
            .iter()
            .map(|(time, prices)| (time.to_string(), prices.to_vec()))
            .collect()
    }

    #[tokio::test]
    async fn odd_sized_group() {
        let stats = compute(observations(&[(T1, &[10.0, 20.0, 30.0])]))
            .await
            .unwrap();
        assert_eq!(stats.lowest[T1], 10.0);
        assert_eq!(stats.mean[T1], 20.0);
        assert_eq!(stats.median[T1], 20.0);
        assert_eq!(stats.count[T1], 3);
    }

    #[tokio::test]
    async fn even_sized_group_median_averages_middle_values() {
        let stats = compute(observations(&[(T1, &[15.0, 5.0])])).await.unwrap();
        assert_eq!(stats.median[T1], 10.0);
        assert_eq!(stats.lowest[T1], 5.0);
    }

    #[tokio::test]
    async fn groups_are_independent() {
        let stats = compute(observations(&[(T1, &[1.0]), (T2, &[4.0, 2.0, 9.0, 3.0])]))
            .await
            .unwrap();
        assert_eq!(stats.count.len(), 2);
        assert_eq!(stats.median[T1], 1.0);
        assert_eq!(stats.median[T2], 3.5);
        assert_eq!(stats.mean[T2], 4.5);
        assert_eq!(stats.count[T2], 4);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_statistics() {
        let stats = compute(PriceObservations::new()).await.unwrap();
        assert_eq!(stats, ItemStatistics::default());
    }

    #[test]
    fn grouping_uses_price_per_unit() {
        let t = NaiveDate::from_ymd_opt(2021, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let grouped = group_observations([(100, t, 4), (30, t, 1), (50, t, 0)]);
        assert_eq!(grouped[T1], vec![25.0, 30.0]);
    }

    #[test]
    fn serializes_keyed_by_statistic_name() {
        let stats = ItemStatistics {
            lowest: BTreeMap::from([(T1.to_string(), 1.5)]),
            mean: BTreeMap::from([(T1.to_string(), 2.0)]),
            median: BTreeMap::from([(T1.to_string(), 2.0)]),
            count: BTreeMap::from([(T1.to_string(), 2)]),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["lowest"][T1], 1.5);
        assert_eq!(json["count"][T1], 2);
    }
}
