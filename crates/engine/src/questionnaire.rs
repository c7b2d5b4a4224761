//! Build a UserProfile from questionnaire answers
//!
//! Each answered question contributes the taste vector of the chosen option;
//! the profile is the mean over the answered questions. Skipped or invalid
//! answers do not count, and a questionnaire with no valid answers yields the
//! zero vector rather than an error.

use catalog::{QuestionBank, TasteVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// One answer to a binary-choice question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    OptionA,
    OptionB,
    Skipped,
}

impl Answer {
    /// Lenient parse: `1`/`a` and `2`/`b` (any case, surrounding whitespace
    /// ignored). Anything else is `Skipped`.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "a" => Answer::OptionA,
            "2" | "b" => Answer::OptionB,
            _ => Answer::Skipped,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Answer::Skipped)
    }
}

impl FromStr for Answer {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Answer::parse(s))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::OptionA => write!(f, "1"),
            Answer::OptionB => write!(f, "2"),
            Answer::Skipped => write!(f, "-"),
        }
    }
}

/// Split a comma-separated answer list such as `"1,2,b,,x"`
///
/// Empty fields and anything unrecognised become `Skipped`, so positions
/// still line up with the questions.
pub fn parse_answers(input: &str) -> Vec<Answer> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(',').map(Answer::parse).collect()
}

/// Averaged taste preference of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub taste: TasteVector,
    pub valid_answers: usize,
}

impl UserProfile {
    /// A profile given directly as a taste vector (no questionnaire)
    pub fn from_taste(taste: TasteVector) -> Self {
        Self {
            taste,
            valid_answers: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.taste.is_zero()
    }
}

impl From<TasteVector> for UserProfile {
    fn from(taste: TasteVector) -> Self {
        Self::from_taste(taste)
    }
}

/// Build a UserProfile by averaging the chosen option of every answered
/// question
///
/// Answers are matched to questions by position. Missing answers count as
/// skipped; answers beyond the last question are ignored.
pub fn build_user_profile(questions: &QuestionBank, answers: &[Answer]) -> UserProfile {
    if answers.len() > questions.len() {
        warn!(
            "Got {} answers for {} questions, ignoring the rest",
            answers.len(),
            questions.len()
        );
    }

    let mut sum = TasteVector::zeros();
    let mut valid_answers = 0;

    for (question, answer) in questions.iter().zip(answers) {
        let option = match answer {
            Answer::OptionA => &question.option_a,
            Answer::OptionB => &question.option_b,
            Answer::Skipped => continue,
        };
        sum.add_assign(&option.taste);
        valid_answers += 1;
    }

    let taste = if valid_answers > 0 {
        sum.scale(1.0 / valid_answers as f64)
    } else {
        TasteVector::zeros()
    };

    debug!("Built profile {} from {} answers", taste, valid_answers);

    UserProfile {
        taste,
        valid_answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{AnswerOption, Question};

    fn option(text: &str, taste: [f64; 5]) -> AnswerOption {
        AnswerOption {
            text: text.to_string(),
            taste: TasteVector::new(taste),
        }
    }

    fn create_test_bank() -> QuestionBank {
        QuestionBank::new(vec![
            Question {
                prompt: "Sweet or sour?".to_string(),
                option_a: option("Sweet", [1.0, 0.0, 0.0, 0.0, 0.0]),
                option_b: option("Sour", [0.0, 1.0, 0.0, 0.0, 0.0]),
            },
            Question {
                prompt: "Bitter or fruity?".to_string(),
                option_a: option("Bitter", [0.0, 0.0, 1.0, 0.0, 0.0]),
                option_b: option("Fruity", [0.0, 0.0, 0.0, 1.0, 0.2]),
            },
        ])
    }

    #[test]
    fn test_answer_parsing() {
        assert_eq!(Answer::parse("1"), Answer::OptionA);
        assert_eq!(Answer::parse(" A "), Answer::OptionA);
        assert_eq!(Answer::parse("2"), Answer::OptionB);
        assert_eq!(Answer::parse("b"), Answer::OptionB);
        assert_eq!(Answer::parse("3"), Answer::Skipped);
        assert_eq!(Answer::parse(""), Answer::Skipped);
        assert_eq!("x".parse::<Answer>().unwrap(), Answer::Skipped);
    }

    #[test]
    fn test_parse_answer_list() {
        assert_eq!(
            parse_answers("1,2,,x"),
            vec![Answer::OptionA, Answer::OptionB, Answer::Skipped, Answer::Skipped]
        );
        assert!(parse_answers("  ").is_empty());
    }

    #[test]
    fn test_profile_is_mean_of_chosen_options() {
        let bank = create_test_bank();
        let profile = build_user_profile(&bank, &[Answer::OptionA, Answer::OptionB]);

        assert_eq!(profile.valid_answers, 2);
        assert_eq!(profile.taste.as_array(), &[0.5, 0.0, 0.0, 0.5, 0.1]);
    }

    #[test]
    fn test_skipped_answers_do_not_count() {
        let bank = create_test_bank();
        let profile = build_user_profile(&bank, &[Answer::Skipped, Answer::OptionA]);

        assert_eq!(profile.valid_answers, 1);
        assert_eq!(profile.taste.as_array(), &[0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_no_valid_answers_gives_zero_profile() {
        let bank = create_test_bank();

        let profile = build_user_profile(&bank, &[Answer::Skipped, Answer::Skipped]);
        assert!(profile.is_zero());
        assert_eq!(profile.valid_answers, 0);

        assert!(build_user_profile(&bank, &[]).is_zero());
    }

    #[test]
    fn test_extra_answers_are_ignored() {
        let bank = create_test_bank();
        let profile = build_user_profile(
            &bank,
            &[Answer::OptionB, Answer::OptionA, Answer::OptionA],
        );
        assert_eq!(profile.valid_answers, 2);
        assert_eq!(profile.taste.as_array(), &[0.0, 0.5, 0.5, 0.0, 0.0]);
    }
}
