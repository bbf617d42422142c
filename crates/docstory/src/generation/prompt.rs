//! Locale-specific instruction templates for story and image prompt generation

use crate::language::Locale;

/// Tag wrapping every story segment in the model answer
pub const PART_TAG: &str = "part";
/// Tag wrapping the image prompt in the model answer
pub const IMAGE_PROMPT_TAG: &str = "image_prompt";

/// Prompt formatter for the two generation stages
pub struct PromptFormatter;

impl PromptFormatter {
    /// Instructions turning educational content into `parts` story segments
    pub fn story_prompt(locale: Locale, content: &str, parts: usize) -> String {
        match locale {
            Locale::Portuguese => Self::story_portuguese(content, parts),
            Locale::English => Self::story_english(content, parts),
            Locale::Spanish => Self::story_spanish(content, parts),
        }
    }

    /// Instructions turning one story segment into an image prompt
    pub fn image_prompt(locale: Locale, segment: &str) -> String {
        match locale {
            Locale::Portuguese => Self::image_portuguese(segment),
            Locale::English => Self::image_english(segment),
            Locale::Spanish => Self::image_spanish(segment),
        }
    }

    fn story_portuguese(content: &str, parts: usize) -> String {
        format!(
            r#"Você tem a tarefa de criar uma história educacional para crianças autistas com base em um determinado conteúdo educacional. Seu objetivo é dividir o conteúdo em {parts} partes e criar um segmento de história para cada parte. Aqui estão suas instruções:

1. Primeiro, você receberá um conteúdo educacional. Leia-o cuidadosamente para entender os principais conceitos e informações.

<educational_content>
{content}
</educational_content>

2. Divida o conteúdo educacional em {parts} partes distintas. Cada parte deve conter um conceito-chave ou informação do conteúdo original.

3. Para cada uma das {parts} partes, crie um segmento de história curta que incorpore as informações educacionais de uma forma envolvente e fácil de entender para crianças autistas. Tenha em mente as seguintes diretrizes:

a. Use uma linguagem simples e clara.
b. Evite metáforas, expressões idiomáticas ou conceitos abstratos que podem ser difíceis de entender.
c. Inclua exemplos concretos e descrições visuais.
d. Use a repetição para reforçar pontos importantes.
e. Incorpore detalhes sensoriais quando apropriado.
f. Torne a história interativa fazendo perguntas simples ou incentivando a imaginação.
g. Escreva no máximo 2 parágrafos curtos por segmento.

4. Cada segmento da história deve ser educativo e se relacionar diretamente com o conteúdo do material original.

5. Formate cada parte da história usando tags HTML. Use o seguinte formato:

<part>
[Insira seu segmento de história aqui]
</part>

6. Certifique-se de criar exatamente {parts} partes, cada uma incluída em seu próprio conjunto de tags <part>.

7. Seja criativo com sua narrativa, mas sempre priorize o valor educacional e garanta que as informações-chave do conteúdo original sejam transmitidas com precisão."#,
            content = content,
            parts = parts
        )
    }

    fn story_english(content: &str, parts: usize) -> String {
        format!(
            r#"Your task is to create an educational story for autistic children based on a given educational content. Your goal is to divide the content into {parts} parts and create a story segment for each part. Here are your instructions:

1. First, you will receive educational content. Read it carefully to understand the key concepts and information.

<educational_content>
{content}
</educational_content>

2. Divide the educational content into {parts} distinct parts. Each part should contain a key concept or information from the original content.

3. For each of the {parts} parts, create a short story segment that incorporates the educational information in an engaging and easy-to-understand way for autistic children. Keep the following guidelines in mind:

a. Use simple and clear language.
b. Avoid metaphors, idiomatic expressions, or abstract concepts that may be difficult to understand.
c. Include concrete examples and visual descriptions.
d. Use repetition to reinforce important points.
e. Incorporate sensory details when appropriate.
f. Make the story interactive by asking simple questions or encouraging imagination.
g. Write at most 2 short paragraphs per segment.

4. Each story segment should be educational and directly relate to the content of the original material.

5. Format each part of the story using HTML tags. Use the following format:

<part>
[Insert your story segment here]
</part>

6. Make sure to create exactly {parts} parts, each included in its own set of <part> tags.

7. Be creative with your storytelling, but always prioritize educational value and ensure that the key information from the original content is conveyed accurately."#,
            content = content,
            parts = parts
        )
    }

    fn story_spanish(content: &str, parts: usize) -> String {
        format!(
            r#"Tienes la tarea de crear una historia educativa para niños autistas basada en un contenido educativo determinado. Tu objetivo es dividir el contenido en {parts} partes y crear un segmento de historia para cada parte. Aquí tienes tus instrucciones:

1. Primero, recibirás un contenido educativo. Léelo con cuidado para entender los conceptos e información clave.

<educational_content>
{content}
</educational_content>

2. Divide el contenido educativo en {parts} partes distintas. Cada parte debe contener un concepto clave o información del contenido original.

3. Para cada una de las {parts} partes, crea un segmento de historia breve que incorpore la información educativa de manera atractiva y fácil de entender para los niños autistas. Ten en cuenta las siguientes pautas:

a. Usa un lenguaje simple y claro.
b. Evita metáforas, expresiones idiomáticas o conceptos abstractos que puedan ser difíciles de entender.
c. Incluye ejemplos concretos y descripciones visuales.
d. Usa la repetición para reforzar los puntos importantes.
e. Incorpora detalles sensoriales cuando sea apropiado.
f. Haz que la historia sea interactiva haciendo preguntas simples o incentivando la imaginación.
g. Escribe como máximo 2 párrafos cortos por segmento.

4. Cada segmento de la historia debe ser educativo y estar directamente relacionado con el contenido del material original.

5. Formatea cada parte de la historia usando etiquetas HTML. Usa el siguiente formato:

<part>
[Inserta tu segmento de historia aquí]
</part>

6. Asegúrate de crear exactamente {parts} partes, cada una incluida en su propio conjunto de etiquetas <part>.

7. Sé creativo con tu narrativa, pero siempre prioriza el valor educativo y asegúrate de que la información clave del contenido original se transmita con precisión."#,
            content = content,
            parts = parts
        )
    }

    fn image_portuguese(segment: &str) -> String {
        format!(
            r#"Você tem a tarefa de criar um prompt de imagem claro, específico e conciso com base em um fragmento de uma história. Seu objetivo é capturar os principais elementos visuais do texto e traduzi-los em um prompt que pode ser usado para gerar uma imagem.

<story_segment>
{segment}
</story_segment>

Diretrizes para criar o prompt de imagem:
1. Concentre-se nos elementos visualmente mais marcantes ou importantes do fragmento da história.
2. Seja específico sobre cores, texturas, iluminação e composição quando relevante.
3. Mantenha o prompt conciso, idealmente não mais do que 2-3 frases.
4. Use uma linguagem simples e direta.
5. Evite conceitos abstratos ou metáforas.
6. Inclua detalhes sensoriais que uma criança autista pode achar envolventes.
7. Use adjetivos descritivos para melhorar a qualidade visual.

Com base neste fragmento da história, crie um prompt de imagem claro e específico. O prompt deve ser detalhado o suficiente para gerar uma imagem vívida, mas conciso o suficiente para ser facilmente compreendido por uma IA de geração de imagens.

Escreva seu prompt final dentro das tags <image_prompt></image_prompt>."#,
            segment = segment
        )
    }

    fn image_english(segment: &str) -> String {
        format!(
            r#"You are tasked with creating a clear, specific, and concise image prompt based on a story fragment. Your goal is to capture the key visual elements of the text and translate them into a prompt that can be used to generate an image.

<story_segment>
{segment}
</story_segment>

Guidelines for creating the image prompt:
1. Focus on the most visually striking or important elements of the story fragment.
2. Be specific about colors, textures, lighting, and composition where relevant.
3. Keep the prompt concise, ideally no more than 2-3 sentences.
4. Use simple, direct language.
5. Avoid abstract concepts or metaphors.
6. Include sensory details that an autistic child might find engaging.
7. Use descriptive adjectives to enhance visual quality.

Based on this story fragment, create a clear and specific image prompt. The prompt should be detailed enough to generate a vivid image, but concise enough to be easily understood by an image-generating AI.

Write your final prompt inside <image_prompt></image_prompt> tags."#,
            segment = segment
        )
    }

    fn image_spanish(segment: &str) -> String {
        format!(
            r#"Su tarea es crear un prompt de imagen claro, específico y conciso basado en un fragmento de una historia. Su objetivo es capturar los elementos visuales clave del texto y traducirlos en un prompt que pueda usarse para generar una imagen.

<story_segment>
{segment}
</story_segment>

Directrices para crear el prompt de imagen:
1. Céntrese en los elementos visualmente más impactantes o importantes del fragmento de la historia.
2. Sea específico sobre colores, texturas, iluminación y composición cuando sea relevante.
3. Mantenga el prompt conciso, idealmente no más de 2 o 3 oraciones.
4. Utilice un lenguaje sencillo y directo.
5. Evite conceptos abstractos o metáforas.
6. Incluya detalles sensoriales que un niño autista pueda encontrar atractivos.
7. Utilice adjetivos descriptivos para mejorar la calidad visual.

A partir de este fragmento de historia, cree un prompt de imagen claro y específico. El prompt debe ser lo suficientemente detallado como para generar una imagen vívida, pero lo suficientemente conciso como para que una IA de generación de imágenes lo entienda fácilmente.

Escriba su prompt final dentro de las etiquetas <image_prompt></image_prompt>."#,
            segment = segment
        )
    }
}
