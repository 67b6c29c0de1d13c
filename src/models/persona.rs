use phf::phf_map;
use serde::Serialize;

/// 目标受众
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// 小学
    Primary,
    /// 初中
    Secondary,
    /// 高中
    HighSchool,
    /// 大学
    University,
    /// 职场
    Professional,
    /// 通用（开放式点评）
    General,
}

/// 别名表（英文 / 西班牙文）
static PERSONA_ALIASES: phf::Map<&'static str, Persona> = phf_map! {
    "primary" => Persona::Primary,
    "primaria" => Persona::Primary,
    "elementary" => Persona::Primary,
    "secondary" => Persona::Secondary,
    "secundaria" => Persona::Secondary,
    "middle-school" => Persona::Secondary,
    "high-school" => Persona::HighSchool,
    "highschool" => Persona::HighSchool,
    "preparatoria" => Persona::HighSchool,
    "bachillerato" => Persona::HighSchool,
    "university" => Persona::University,
    "universidad" => Persona::University,
    "college" => Persona::University,
    "professional" => Persona::Professional,
    "profesional" => Persona::Professional,
    "business" => Persona::Professional,
    "general" => Persona::General,
    "open" => Persona::General,
    "libre" => Persona::General,
};

impl Persona {
    /// 解析受众（忽略大小写，空格和下划线视为连字符）
    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace([' ', '_'], "-");
        PERSONA_ALIASES.get(key.as_str()).copied()
    }

    /// 是否为学校类受众（走评分标准路径）
    pub fn is_school_level(self) -> bool {
        matches!(
            self,
            Persona::Primary | Persona::Secondary | Persona::HighSchool | Persona::University
        )
    }

    /// 写入提示词的受众描述
    pub fn audience_label(self) -> &'static str {
        match self {
            Persona::Primary => "primary school students",
            Persona::Secondary => "secondary school students",
            Persona::HighSchool => "high school students",
            Persona::University => "university students",
            Persona::Professional => "professionals in a business setting",
            Persona::General => "a general audience",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Persona::Primary => "primary",
            Persona::Secondary => "secondary",
            Persona::HighSchool => "high-school",
            Persona::University => "university",
            Persona::Professional => "professional",
            Persona::General => "general",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 演示文稿的主题 / 类型 / 目标（开放式点评使用）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PresentationBrief {
    pub theme: Option<String>,
    pub kind: Option<String>,
    pub goal: Option<String>,
}

impl PresentationBrief {
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.kind.is_none() && self.goal.is_none()
    }
}
