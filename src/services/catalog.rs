// src/services/catalog.rs

//! Built-in courses and their static question banks.

use serde::Serialize;

use crate::models::question::QuizQuestion;

#[derive(Debug, Clone)]
pub struct Course {
    pub id: &'static str,
    pub title: &'static str,
    pub questions: Vec<QuizQuestion>,
}

/// Catalog entry as listed to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub question_count: usize,
}

impl From<&Course> for CourseSummary {
    fn from(c: &Course) -> Self {
        Self {
            id: c.id,
            title: c.title,
            question_count: c.questions.len(),
        }
    }
}

fn q(id: u32, question: &str, options: [&str; 4], correct_answer: usize) -> QuizQuestion {
    QuizQuestion {
        id,
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: None,
    }
}

fn informatique() -> Vec<QuizQuestion> {
    vec![
        q(1, "Qu’est-ce qu’un ordinateur ?", ["Une machine à écrire", "Un appareil qui traite des informations", "Une télévision", "Un téléphone portable"], 1),
        q(2, "Le matériel informatique représente :", ["Les programmes", "Les pièces physiques de l’ordinateur", "Internet", "Les comptes utilisateur"], 1),
        q(3, "Le processeur (CPU) sert à :", ["Stocker des données", "Exécuter les instructions", "Imprimer", "Afficher des images"], 1),
        q(4, "La mémoire RAM sert à :", ["Stocker définitivement", "Accélérer le traitement des données", "Remplacer la batterie", "Régler le volume"], 1),
        q(5, "Un disque dur HDD est :", ["Plus lent qu’un SSD", "Plus rapide qu’un SSD", "Un écran", "Une imprimante"], 0),
        q(6, "Un SSD est :", ["Un disque plus rapide", "Un haut-parleur", "Une carte réseau", "Un logiciel"], 0),
        q(7, "Un périphérique est :", ["Le système d’exploitation", "Un appareil connecté à l’ordinateur", "Une application", "Une page internet"], 1),
        q(8, "Exemple de périphérique d’entrée :", ["Écran", "Imprimante", "Clavier", "Haut-parleur"], 2),
        q(9, "Exemple de périphérique de sortie :", ["Souris", "Microphone", "Scanner", "Écran"], 3),
        q(10, "La carte mère sert à :", ["Afficher les images", "Connecter toutes les pièces de l’ordinateur", "Éteindre l’ordinateur", "Naviguer sur Internet"], 1),
    ]
}

fn calendar_word() -> Vec<QuizQuestion> {
    vec![
        q(1, "Ki kote ou ale pou jwenn yon modèl kalandriye tou pare?", ["File > New", "Insert > Table", "Layout > Margins", "Home > Font"], 0),
        q(2, "Konbyen kolòn ou bezwen pou jou semèn nan?", ["5", "7", "10", "12"], 1),
        q(3, "Ki opsyon ki pèmèt ou vire paj la an orizontal?", ["Portrait", "Vertical", "Landscape", "Zoom"], 2),
        q(4, "Kijan ou ka ajoute koulè nan tablo a?", ["Table Design > Shading", "Insert > Photo", "View > Color", "File > Print"], 0),
        q(5, "Èske ou ka sove fichye Word la an PDF?", ["Wi", "Non", "Sèlman si ou peye", "Sèlman sou Lendi"], 0),
    ]
}

pub fn courses() -> Vec<Course> {
    vec![
        Course {
            id: "informatique",
            title: "Informatique",
            questions: informatique(),
        },
        Course {
            id: "canva",
            title: "Canva Mastery",
            questions: vec![q(1, "Qu’est-ce que Canva ?", ["Un antivirus", "Un logiciel de design graphique en ligne", "Un réseau social", "Un éditeur de code"], 1)],
        },
        Course {
            id: "wordpress",
            title: "WordPress de A à Z",
            questions: vec![q(1, "WordPress est :", ["Un jeu vidéo", "Un CMS", "Un navigateur", "Un antivirus"], 1)],
        },
        Course {
            id: "calendar-word",
            title: "Kalandriye sou Microsoft Word",
            questions: calendar_word(),
        },
    ]
}

pub fn find_course(id: &str) -> Option<Course> {
    courses().into_iter().find(|c| c.id == id)
}
