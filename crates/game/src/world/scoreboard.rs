use crate::net::{Player, PlayerId};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub id: PlayerId,
    pub kills: i32,
    pub deaths: i32,
    pub kd_ratio: f32,
    pub is_local: bool,
}

impl ScoreRow {
    pub fn new(player: &Player, is_local: bool) -> Self {
        let kills = player.stats.kills;
        let deaths = player.stats.deaths;
        let kd_ratio = if deaths == 0 {
            kills as f32
        } else {
            kills as f32 / deaths as f32
        };

        Self {
            id: player.id,
            kills,
            deaths,
            kd_ratio,
            is_local,
        }
    }

    pub fn net_score(&self) -> i32 {
        self.kills - self.deaths
    }
}

/// Ranks players by kills minus deaths, best first. Ties keep input order.
pub fn rank<'a>(local: &Player, others: impl IntoIterator<Item = &'a Player>) -> Vec<ScoreRow> {
    let mut rows: Vec<ScoreRow> = others
        .into_iter()
        .map(|player| ScoreRow::new(player, false))
        .collect();
    rows.push(ScoreRow::new(local, true));
    rows.sort_by(|a, b| b.net_score().cmp(&a.net_score()));
    rows
}
