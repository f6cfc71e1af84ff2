use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, GameDao, PaginatedResponse},
    db::entities::game,
    error::AppError,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const UCI_PATTERN: &str = r"^[a-h][1-8][a-h][1-8][qrbn]?$";
const SAN_PATTERN: &str =
    r"^(O-O(-O)?|[KQRBN][a-h]?[1-8]?x?[a-h][1-8]|[a-h](x[a-h])?[1-8](=[QRBN])?)[+#]?$";
const EN_PASSANT_PATTERN: &str = r"^[a-h][36]$";

static UCI_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(UCI_PATTERN).ok());
static SAN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(SAN_PATTERN).ok());
static EN_PASSANT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(EN_PASSANT_PATTERN).ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }
}

impl TryFrom<&str> for PlayerColor {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "white" => Ok(PlayerColor::White),
            "black" => Ok(PlayerColor::Black),
            _ => Err(AppError::field(
                "player_color",
                "Player color must be white or black",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    WhiteWon,
    BlackWon,
    Draw,
    Abandoned,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::WhiteWon => "white_won",
            GameStatus::BlackWon => "black_won",
            GameStatus::Draw => "draw",
            GameStatus::Abandoned => "abandoned",
        }
    }
}

impl TryFrom<&str> for GameStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(GameStatus::Active),
            "white_won" => Ok(GameStatus::WhiteWon),
            "black_won" => Ok(GameStatus::BlackWon),
            "draw" => Ok(GameStatus::Draw),
            "abandoned" => Ok(GameStatus::Abandoned),
            _ => Err(AppError::field("status", "Unknown game status")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub id: Uuid,
    pub player_color: String,
    pub fen: String,
    pub moves: Vec<String>,
    pub status: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<game::Model> for GameView {
    fn from(model: game::Model) -> Self {
        Self {
            id: model.id,
            player_color: model.player_color,
            fen: model.fen,
            moves: model.moves.split_whitespace().map(str::to_string).collect(),
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Shape check only: six fields, eight ranks of eight squares. Whether the
/// position is reachable is not checked.
pub fn validate_fen(fen: &str) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::field("fen", format!("Invalid FEN: {reason}"));
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(invalid("expected 6 fields"));
    }

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("expected 8 ranks"));
    }
    for rank in ranks {
        let mut squares = 0u32;
        for c in rank.chars() {
            match c {
                '1'..='8' => squares += c.to_digit(10).unwrap_or(0),
                'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => {
                    squares += 1
                }
                _ => return Err(invalid("unexpected piece character")),
            }
        }
        if squares != 8 {
            return Err(invalid("each rank must cover 8 squares"));
        }
    }

    if !matches!(fields[1], "w" | "b") {
        return Err(invalid("side to move must be w or b"));
    }
    if fields[2] != "-" && !fields[2].chars().all(|c| "KQkq".contains(c)) {
        return Err(invalid("bad castling field"));
    }
    let ep_ok = fields[3] == "-"
        || EN_PASSANT_RE.as_ref().is_some_and(|re| re.is_match(fields[3]));
    if !ep_ok {
        return Err(invalid("bad en passant square"));
    }
    if fields[4].parse::<u32>().is_err() {
        return Err(invalid("bad halfmove clock"));
    }
    if !fields[5].parse::<u32>().is_ok_and(|n| n >= 1) {
        return Err(invalid("bad fullmove number"));
    }
    Ok(())
}

pub fn is_move_notation(mv: &str) -> bool {
    UCI_RE.as_ref().is_some_and(|re| re.is_match(mv))
        || SAN_RE.as_ref().is_some_and(|re| re.is_match(mv))
}

#[derive(Clone)]
pub struct GameService {
    game_dao: GameDao,
}

impl GameService {
    pub fn new(game_dao: GameDao) -> Self {
        Self { game_dao }
    }

    async fn require_owned(&self, user_id: &Uuid, game_id: &Uuid) -> Result<game::Model, AppError> {
        self.game_dao
            .find_owned(user_id, game_id)
            .await?
            .ok_or_else(|| AppError::not_found("Game not found"))
    }

    pub async fn create_game(
        &self,
        user_id: &Uuid,
        player_color: &str,
        fen: Option<&str>,
    ) -> Result<GameView, AppError> {
        let color = PlayerColor::try_from(player_color)?;
        let fen = fen.map(str::trim).unwrap_or(START_FEN);
        validate_fen(fen)?;

        let model = self
            .game_dao
            .create_game(user_id, color.as_str(), fen, GameStatus::Active.as_str())
            .await?;
        Ok(model.into())
    }

    pub async fn list_games(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<GameView>, AppError> {
        let page = self.game_dao.list_for_user(user_id, page, page_size).await?;
        Ok(page.map(GameView::from))
    }

    pub async fn get_game(&self, user_id: &Uuid, game_id: &Uuid) -> Result<GameView, AppError> {
        Ok(self.require_owned(user_id, game_id).await?.into())
    }

    /// Appends `mv` as submitted. No legality checks are made. The write is
    /// conditional on the move list read here, so of two concurrent moves on
    /// one game only the first lands and the other gets a 409.
    pub async fn apply_move(
        &self,
        user_id: &Uuid,
        game_id: &Uuid,
        mv: &str,
        fen: Option<&str>,
    ) -> Result<GameView, AppError> {
        let mv = mv.trim();
        if !is_move_notation(mv) {
            return Err(AppError::field(
                "move",
                "Move must be in UCI (e2e4) or SAN (Nf3) notation",
            ));
        }
        if let Some(fen) = fen {
            validate_fen(fen)?;
        }

        let game = self.require_owned(user_id, game_id).await?;
        if game.status != GameStatus::Active.as_str() {
            return Err(AppError::conflict("Game is not active"));
        }

        let moves = if game.moves.is_empty() {
            mv.to_string()
        } else {
            format!("{} {mv}", game.moves)
        };
        let rows = self
            .game_dao
            .record_move(
                &game.id,
                &game.moves,
                GameStatus::Active.as_str(),
                moves,
                fen.map(|f| f.trim().to_string()),
                Utc::now().fixed_offset(),
            )
            .await?;
        if rows == 0 {
            return Err(AppError::conflict(
                "Game changed while the move was being saved, reload and retry",
            ));
        }

        Ok(self.require_owned(user_id, game_id).await?.into())
    }

    /// Only an active game can be finished.
    pub async fn update_status(
        &self,
        user_id: &Uuid,
        game_id: &Uuid,
        status: &str,
    ) -> Result<GameView, AppError> {
        let status = GameStatus::try_from(status)?;
        if status == GameStatus::Active {
            return Err(AppError::field("status", "Status must be a finished state"));
        }

        let game = self.require_owned(user_id, game_id).await?;
        if game.status != GameStatus::Active.as_str() {
            return Err(AppError::conflict("Game is not active"));
        }

        let updated = self.game_dao.set_status(&game.id, status.as_str()).await?;
        Ok(updated.into())
    }

    pub async fn delete_game(&self, user_id: &Uuid, game_id: &Uuid) -> Result<(), AppError> {
        let game = self.require_owned(user_id, game_id).await?;
        self.game_dao.delete(game.id).await?;
        Ok(())
    }
}
