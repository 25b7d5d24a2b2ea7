//! キャンバスの設定（サイズ、パレット、クールダウン）

use std::{collections::HashSet, time::Duration};

use super::{
    error::ValueObjectError,
    value_object::{Color, Coordinate},
};

/// デフォルトの 16 色パレット
pub const DEFAULT_PALETTE: [&str; 16] = [
    "#FFFFFF", "#E4E4E4", "#888888", "#222222", "#FFA7D1", "#E50000", "#E59500", "#A06A42",
    "#E5D900", "#94E044", "#02BE01", "#00D3DD", "#0083C7", "#0000EA", "#CF6EE4", "#820080",
];

/// 配置可能な色の集合
///
/// 設定された順序を保持する。色の比較は設定値との完全一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// 色のリストから Palette を作成
    ///
    /// 空のパレット、不正な形式、重複はエラーになる。
    pub fn new<S: AsRef<str>>(colors: &[S]) -> Result<Self, ValueObjectError> {
        if colors.is_empty() {
            return Err(ValueObjectError::EmptyPalette);
        }

        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(colors.len());
        for raw in colors {
            let color = Color::parse(raw.as_ref())?;
            if !seen.insert(color.clone()) {
                return Err(ValueObjectError::DuplicateColor(color.into_string()));
            }
            parsed.push(color);
        }

        Ok(Self { colors: parsed })
    }

    /// パレットに含まれる色なら Color を返す
    pub fn resolve(&self, value: &str) -> Option<Color> {
        self.colors.iter().find(|c| c.as_str() == value).cloned()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .map(|c| Color::parse(c).expect("default palette entries are valid"))
                .collect(),
        }
    }
}

/// キャンバスの設定
#[derive(Debug, Clone)]
pub struct CanvasSettings {
    width: u32,
    height: u32,
    palette: Palette,
    cooldown: Duration,
}

impl CanvasSettings {
    pub fn new(
        width: u32,
        height: u32,
        palette: Palette,
        cooldown: Duration,
    ) -> Result<Self, ValueObjectError> {
        if width == 0 || height == 0 {
            return Err(ValueObjectError::InvalidCanvasSize { width, height });
        }
        if cooldown.is_zero() {
            return Err(ValueObjectError::InvalidCooldown);
        }
        Ok(Self {
            width,
            height,
            palette,
            cooldown,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// `[0, width) x [0, height)` の範囲内なら Coordinate を返す
    pub fn locate(&self, x: i64, y: i64) -> Option<Coordinate> {
        let in_bounds =
            (0..i64::from(self.width)).contains(&x) && (0..i64::from(self.height)).contains(&y);
        in_bounds.then(|| Coordinate::new(x as u32, y as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_3x3() -> CanvasSettings {
        CanvasSettings::new(
            3,
            3,
            Palette::new(&["#FFFFFF", "#000000"]).unwrap(),
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[test]
    fn test_default_palette_has_sixteen_colors() {
        // テスト項目: デフォルトパレットは 16 色
        let palette = Palette::default();
        assert_eq!(palette.colors().len(), 16);
        assert_eq!(palette.colors()[0].as_str(), "#FFFFFF");
    }

    #[test]
    fn test_palette_rejects_empty_and_duplicates() {
        // テスト項目: 空のパレットと重複した色はエラーになる
        let empty: [&str; 0] = [];
        assert_eq!(Palette::new(&empty), Err(ValueObjectError::EmptyPalette));
        assert_eq!(
            Palette::new(&["#FFFFFF", "#FFFFFF"]),
            Err(ValueObjectError::DuplicateColor("#FFFFFF".to_string()))
        );
        assert!(matches!(
            Palette::new(&["white"]),
            Err(ValueObjectError::InvalidColorFormat(_))
        ));
    }

    #[test]
    fn test_palette_resolve_is_exact_match() {
        // テスト項目: パレットの色は完全一致でのみ解決される
        let palette = Palette::new(&["#FFFFFF", "#000000"]).unwrap();
        assert_eq!(palette.resolve("#000000").unwrap().as_str(), "#000000");
        assert!(palette.resolve("#ffffff").is_none());
        assert!(palette.resolve("#123456").is_none());
    }

    #[test]
    fn test_locate_within_bounds() {
        // テスト項目: 範囲内の座標は Coordinate に変換される
        let settings = settings_3x3();
        assert_eq!(settings.locate(0, 0), Some(Coordinate::new(0, 0)));
        assert_eq!(settings.locate(2, 2), Some(Coordinate::new(2, 2)));
    }

    #[test]
    fn test_locate_out_of_bounds() {
        // テスト項目: 範囲外の座標は None になる
        let settings = settings_3x3();
        assert_eq!(settings.locate(-1, 0), None);
        assert_eq!(settings.locate(0, -1), None);
        assert_eq!(settings.locate(3, 0), None);
        assert_eq!(settings.locate(0, 3), None);
        assert_eq!(settings.locate(i64::MAX, i64::MIN), None);
    }

    #[test]
    fn test_settings_validation() {
        // テスト項目: サイズ 0 やクールダウン 0 は作成できない
        assert!(matches!(
            CanvasSettings::new(0, 3, Palette::default(), Duration::from_secs(30)),
            Err(ValueObjectError::InvalidCanvasSize { .. })
        ));
        assert_eq!(
            CanvasSettings::new(3, 3, Palette::default(), Duration::ZERO).unwrap_err(),
            ValueObjectError::InvalidCooldown
        );
    }
}
